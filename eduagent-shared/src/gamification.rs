/// Experience and level rules
///
/// Completing a module for the first time awards [`XP_PER_MODULE`]. Levels
/// are a pure function of XP so they can never drift from it. Marking a
/// module incomplete again does not take XP back.
use crate::models::user::UserStats;

/// XP awarded for each newly completed module
pub const XP_PER_MODULE: i64 = 10;

/// XP needed to advance one level
pub const XP_PER_LEVEL: i64 = 100;

/// Level for a given XP total (level 1 at 0 XP)
pub fn level_for_xp(xp: i64) -> i32 {
    let level = 1 + xp.max(0) / XP_PER_LEVEL;
    i32::try_from(level).unwrap_or(i32::MAX)
}

impl UserStats {
    /// Adds XP and recomputes the level
    pub fn award_xp(&mut self, amount: i64) {
        self.xp = self.xp.saturating_add(amount.max(0));
        self.level = level_for_xp(self.xp);
    }

    /// Records one newly completed module
    pub fn record_module_completion(&mut self) {
        self.award_xp(XP_PER_MODULE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_xp() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(99), 1);
        assert_eq!(level_for_xp(100), 2);
        assert_eq!(level_for_xp(250), 3);
        assert_eq!(level_for_xp(-40), 1);
    }

    #[test]
    fn test_ten_completions_level_up() {
        let mut stats = UserStats::default();

        for _ in 0..9 {
            stats.record_module_completion();
        }
        assert_eq!(stats.xp, 90);
        assert_eq!(stats.level, 1);

        stats.record_module_completion();
        assert_eq!(stats.xp, 100);
        assert_eq!(stats.level, 2);
    }

    #[test]
    fn test_negative_award_ignored() {
        let mut stats = UserStats::default();
        stats.award_xp(-50);
        assert_eq!(stats.xp, 0);
        assert_eq!(stats.level, 1);
    }
}
