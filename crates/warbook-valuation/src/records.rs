// Input records for the valuation engine: player attributes, season lines,
// and the role enum parsed from free-form position text.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// The defensive role a player is valued at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Catcher,
    FirstBase,
    SecondBase,
    ThirdBase,
    ShortStop,
    LeftField,
    CenterField,
    RightField,
    /// Generic outfield, used when the feed does not split LF/CF/RF.
    Outfield,
    DesignatedHitter,
    StartingPitcher,
    ReliefPitcher,
    /// Regular hitter who also takes a rotation turn.
    TwoWay,
}

impl Role {
    /// Parse a position string into a Role.
    ///
    /// Accepts the usual abbreviations ("SS", "1B", "DH", "TWP") as well as
    /// spelled-out names ("shortstop", "Designated Hitter", "two-way player").
    /// Case, spaces, hyphens and underscores are ignored. Returns `None` for
    /// anything unrecognized; callers treat that as a neutral role.
    pub fn from_str_pos(s: &str) -> Option<Self> {
        let key: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_uppercase();

        match key.as_str() {
            "C" | "CATCHER" => Some(Role::Catcher),
            "1B" | "FIRSTBASE" | "FIRSTBASEMAN" => Some(Role::FirstBase),
            "2B" | "SECONDBASE" | "SECONDBASEMAN" => Some(Role::SecondBase),
            "3B" | "THIRDBASE" | "THIRDBASEMAN" => Some(Role::ThirdBase),
            "SS" | "SHORTSTOP" => Some(Role::ShortStop),
            "LF" | "LEFTFIELD" | "LEFTFIELDER" => Some(Role::LeftField),
            "CF" | "CENTERFIELD" | "CENTERFIELDER" | "CENTREFIELD" => Some(Role::CenterField),
            "RF" | "RIGHTFIELD" | "RIGHTFIELDER" => Some(Role::RightField),
            "OF" | "OUTFIELD" | "OUTFIELDER" => Some(Role::Outfield),
            "DH" | "DESIGNATEDHITTER" => Some(Role::DesignatedHitter),
            "SP" | "P" | "PITCHER" | "STARTINGPITCHER" | "STARTER" => Some(Role::StartingPitcher),
            "RP" | "CL" | "CLOSER" | "RELIEFPITCHER" | "RELIEVER" => Some(Role::ReliefPitcher),
            "TWP" | "TWOWAY" | "TWOWAYPLAYER" => Some(Role::TwoWay),
            _ => None,
        }
    }

    /// Return the display abbreviation for this role.
    pub fn display_str(&self) -> &'static str {
        match self {
            Role::Catcher => "C",
            Role::FirstBase => "1B",
            Role::SecondBase => "2B",
            Role::ThirdBase => "3B",
            Role::ShortStop => "SS",
            Role::LeftField => "LF",
            Role::CenterField => "CF",
            Role::RightField => "RF",
            Role::Outfield => "OF",
            Role::DesignatedHitter => "DH",
            Role::StartingPitcher => "SP",
            Role::ReliefPitcher => "RP",
            Role::TwoWay => "TWP",
        }
    }

    /// Whether the role is pitching-only. Two-way players count as hitters.
    pub fn is_pitcher(&self) -> bool {
        matches!(self, Role::StartingPitcher | Role::ReliefPitcher)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_str())
    }
}

// ---------------------------------------------------------------------------
// Player and season records
// ---------------------------------------------------------------------------

/// Slow-changing attributes of the player being valued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub age: Option<u32>,
    /// Free-form position text as supplied by the stats feed.
    #[serde(default)]
    pub position: String,
    /// Games played this season, if the feed reports it on the player row.
    pub games_played: Option<u32>,
}

impl PlayerRecord {
    pub fn new(age: Option<u32>, position: impl Into<String>, games_played: Option<u32>) -> Self {
        PlayerRecord {
            age,
            position: position.into(),
            games_played,
        }
    }

    /// The parsed role, or `None` when the position text is unrecognized.
    pub fn role(&self) -> Option<Role> {
        Role::from_str_pos(&self.position)
    }
}

/// One season of performance for a player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonRecord {
    pub season: i32,
    /// Win contribution for the season (~2 replacement level, ~8+ elite).
    pub metric: f64,
    pub games_played: Option<u32>,
    /// Composite power score on a 0-100 percentile scale.
    #[serde(default)]
    pub secondary_metric: Option<f64>,
}

impl SeasonRecord {
    pub fn new(season: i32, metric: f64, games_played: Option<u32>) -> Self {
        SeasonRecord {
            season,
            metric,
            games_played,
            secondary_metric: None,
        }
    }

    pub fn with_secondary(mut self, secondary_metric: f64) -> Self {
        self.secondary_metric = Some(secondary_metric);
        self
    }
}

/// Replace NaN and infinities with 0.0.
pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_abbreviations() {
        assert_eq!(Role::from_str_pos("SS"), Some(Role::ShortStop));
        assert_eq!(Role::from_str_pos("1b"), Some(Role::FirstBase));
        assert_eq!(Role::from_str_pos("dh"), Some(Role::DesignatedHitter));
        assert_eq!(Role::from_str_pos("RP"), Some(Role::ReliefPitcher));
        assert_eq!(Role::from_str_pos("TWP"), Some(Role::TwoWay));
        assert_eq!(Role::from_str_pos("OF"), Some(Role::Outfield));
    }

    #[test]
    fn parses_spelled_out_names() {
        assert_eq!(Role::from_str_pos("shortstop"), Some(Role::ShortStop));
        assert_eq!(Role::from_str_pos("Designated Hitter"), Some(Role::DesignatedHitter));
        assert_eq!(Role::from_str_pos("two-way player"), Some(Role::TwoWay));
        assert_eq!(Role::from_str_pos("Center_Field"), Some(Role::CenterField));
        assert_eq!(Role::from_str_pos("Relief Pitcher"), Some(Role::ReliefPitcher));
    }

    #[test]
    fn unknown_position_is_none() {
        assert_eq!(Role::from_str_pos(""), None);
        assert_eq!(Role::from_str_pos("UTIL"), None);
        assert_eq!(Role::from_str_pos("goalkeeper"), None);
    }

    #[test]
    fn display_round_trips_through_parser() {
        for role in [
            Role::Catcher,
            Role::FirstBase,
            Role::SecondBase,
            Role::ThirdBase,
            Role::ShortStop,
            Role::LeftField,
            Role::CenterField,
            Role::RightField,
            Role::Outfield,
            Role::DesignatedHitter,
            Role::StartingPitcher,
            Role::ReliefPitcher,
            Role::TwoWay,
        ] {
            assert_eq!(Role::from_str_pos(role.display_str()), Some(role));
        }
    }

    #[test]
    fn pitchers_and_two_way() {
        assert!(Role::StartingPitcher.is_pitcher());
        assert!(Role::ReliefPitcher.is_pitcher());
        assert!(!Role::TwoWay.is_pitcher());
        assert!(!Role::Catcher.is_pitcher());
    }

    #[test]
    fn finite_or_zero_coerces() {
        assert_eq!(finite_or_zero(f64::NAN), 0.0);
        assert_eq!(finite_or_zero(f64::INFINITY), 0.0);
        assert_eq!(finite_or_zero(f64::NEG_INFINITY), 0.0);
        assert_eq!(finite_or_zero(-1.5), -1.5);
    }

    #[test]
    fn season_record_deserializes_without_secondary() {
        let json = r#"{"season": 2024, "metric": 5.5, "games_played": null}"#;
        let rec: SeasonRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.season, 2024);
        assert_eq!(rec.games_played, None);
        assert_eq!(rec.secondary_metric, None);
    }
}
