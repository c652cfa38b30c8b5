//! Breathing pacer state machine

use serde::{Deserialize, Serialize};

/// Number of full cycles after which a session counts as complete
pub const SESSION_GOAL_CYCLES: u32 = 5;

/// Wellness points reported for a completed breathing session
pub const SESSION_POINTS: u32 = 25;

/// One stage of a breathing cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Inhale,
    Hold,
    Exhale,
    Rest,
}

impl Phase {
    /// The phase that follows this one; Rest wraps to Inhale
    pub fn next(self) -> Self {
        match self {
            Phase::Inhale => Phase::Hold,
            Phase::Hold => Phase::Exhale,
            Phase::Exhale => Phase::Rest,
            Phase::Rest => Phase::Inhale,
        }
    }

    /// Text shown to the user during this phase
    pub fn instruction(self) -> &'static str {
        match self {
            Phase::Inhale => "Breathe In",
            Phase::Hold => "Hold",
            Phase::Exhale => "Breathe Out",
            Phase::Rest => "Rest",
        }
    }
}

/// Presentation scale of the pacer circle for a phase
pub fn scale_factor(phase: Phase) -> f32 {
    match phase {
        Phase::Inhale | Phase::Hold => 1.5,
        Phase::Exhale | Phase::Rest => 1.0,
    }
}

/// Named duration profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreathingPattern {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl BreathingPattern {
    pub const ALL: [BreathingPattern; 3] = [
        BreathingPattern::Beginner,
        BreathingPattern::Intermediate,
        BreathingPattern::Advanced,
    ];

    /// Look up a pattern by its lowercase name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "beginner" => Some(Self::Beginner),
            "intermediate" => Some(Self::Intermediate),
            "advanced" => Some(Self::Advanced),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }

    /// Seconds spent in `phase` for this pattern
    pub fn duration(self, phase: Phase) -> u32 {
        let [inhale, hold, exhale, rest] = self.durations();
        match phase {
            Phase::Inhale => inhale,
            Phase::Hold => hold,
            Phase::Exhale => exhale,
            Phase::Rest => rest,
        }
    }

    /// Inhale, hold, exhale and rest durations in seconds
    pub fn durations(self) -> [u32; 4] {
        match self {
            Self::Beginner => [4, 2, 4, 2],
            Self::Intermediate => [4, 4, 6, 2],
            Self::Advanced => [6, 6, 8, 4],
        }
    }

    /// Ticks consumed by one full cycle
    pub fn cycle_seconds(self) -> u32 {
        self.durations().iter().sum()
    }

    /// Label such as "4-2-4-2"
    pub fn label(self) -> String {
        let [inhale, hold, exhale, rest] = self.durations();
        format!("{}-{}-{}-{}", inhale, hold, exhale, rest)
    }
}

/// A single breathing session, advanced by an external one-second tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreathingSession {
    pub phase: Phase,
    pub pattern: BreathingPattern,
    pub seconds_remaining: u32,
    pub cycles_completed: u32,
    pub session_seconds: u64,
    pub is_running: bool,
}

impl BreathingSession {
    pub fn new(pattern: BreathingPattern) -> Self {
        Self {
            phase: Phase::Inhale,
            pattern,
            seconds_remaining: pattern.duration(Phase::Inhale),
            cycles_completed: 0,
            session_seconds: 0,
            is_running: false,
        }
    }

    /// True until the first tick of the session has been applied
    pub fn is_fresh(&self) -> bool {
        self.session_seconds == 0 && self.cycles_completed == 0
    }

    pub fn start(&mut self) {
        if self.is_running {
            return;
        }
        if self.is_fresh() {
            self.phase = Phase::Inhale;
            self.seconds_remaining = self.pattern.duration(Phase::Inhale);
        }
        self.is_running = true;
    }

    pub fn pause(&mut self) {
        self.is_running = false;
    }

    pub fn reset(&mut self) {
        self.is_running = false;
        self.phase = Phase::Inhale;
        self.seconds_remaining = self.pattern.duration(Phase::Inhale);
        self.cycles_completed = 0;
        self.session_seconds = 0;
    }

    /// Switch duration profile. A running session is reset and left stopped.
    pub fn set_pattern(&mut self, pattern: BreathingPattern) {
        if self.is_running {
            self.pattern = pattern;
            self.reset();
            return;
        }

        self.pattern = pattern;
        let full = pattern.duration(self.phase);
        if self.is_fresh() {
            self.seconds_remaining = full;
        } else {
            self.seconds_remaining = self.seconds_remaining.min(full);
        }
    }

    /// Apply one elapsed second. Returns true when the phase changed.
    pub fn tick(&mut self) -> bool {
        if !self.is_running {
            return false;
        }

        self.session_seconds += 1;
        if self.seconds_remaining > 1 {
            self.seconds_remaining -= 1;
            return false;
        }

        let next = self.phase.next();
        if self.phase == Phase::Rest {
            self.cycles_completed += 1;
        }
        self.phase = next;
        self.seconds_remaining = self.pattern.duration(next);
        true
    }

    pub fn scale(&self) -> f32 {
        scale_factor(self.phase)
    }

    /// Whether the "session complete" acknowledgement should be shown
    pub fn is_complete(&self) -> bool {
        self.cycles_completed >= SESSION_GOAL_CYCLES
    }

    pub fn points_earned(&self) -> u32 {
        if self.is_complete() { SESSION_POINTS } else { 0 }
    }
}

impl Default for BreathingSession {
    fn default() -> Self {
        Self::new(BreathingPattern::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(pattern: BreathingPattern) -> BreathingSession {
        let mut session = BreathingSession::new(pattern);
        session.start();
        session
    }

    #[test]
    fn test_new_session_waits_in_inhale() {
        let session = BreathingSession::new(BreathingPattern::Advanced);
        assert_eq!(session.phase, Phase::Inhale);
        assert_eq!(session.seconds_remaining, 6);
        assert!(!session.is_running);
        assert_eq!(session.cycles_completed, 0);
    }

    #[test]
    fn test_one_cycle_consumes_pattern_sum() {
        for pattern in BreathingPattern::ALL {
            let mut session = running(pattern);
            let total = pattern.cycle_seconds();

            for _ in 0..total - 1 {
                session.tick();
                assert_eq!(session.cycles_completed, 0, "{:?}", pattern);
            }
            session.tick();
            assert_eq!(session.cycles_completed, 1, "{:?}", pattern);
            assert_eq!(session.phase, Phase::Inhale);
            assert_eq!(session.seconds_remaining, pattern.duration(Phase::Inhale));
            assert_eq!(session.session_seconds, total as u64);
        }
    }

    #[test]
    fn test_phase_order_and_countdown() {
        let mut session = running(BreathingPattern::Beginner);
        let mut seen = vec![session.phase];
        for _ in 0..BreathingPattern::Beginner.cycle_seconds() {
            if session.tick() {
                seen.push(session.phase);
            }
            assert!(session.seconds_remaining >= 1);
            assert!(session.seconds_remaining <= session.pattern.duration(session.phase));
        }
        assert_eq!(
            seen,
            vec![Phase::Inhale, Phase::Hold, Phase::Exhale, Phase::Rest, Phase::Inhale]
        );
    }

    #[test]
    fn test_tick_while_paused_is_ignored() {
        let mut session = BreathingSession::default();
        assert!(!session.tick());
        assert_eq!(session, BreathingSession::default());
    }

    #[test]
    fn test_pause_resume_keeps_counters() {
        let mut session = running(BreathingPattern::Intermediate);
        for _ in 0..23 {
            session.tick();
        }
        let before = session.clone();

        session.pause();
        session.start();

        assert_eq!(session.phase, before.phase);
        assert_eq!(session.seconds_remaining, before.seconds_remaining);
        assert_eq!(session.cycles_completed, before.cycles_completed);
        assert_eq!(session.session_seconds, before.session_seconds);
        assert!(session.is_running);
    }

    #[test]
    fn test_start_is_idempotent_while_running() {
        let mut session = running(BreathingPattern::Beginner);
        session.tick();
        let before = session.clone();
        session.start();
        assert_eq!(session, before);
    }

    #[test]
    fn test_reset_from_any_state() {
        let mut session = running(BreathingPattern::Advanced);
        for _ in 0..57 {
            session.tick();
        }
        session.reset();

        assert_eq!(session.phase, Phase::Inhale);
        assert_eq!(session.seconds_remaining, 6);
        assert_eq!(session.cycles_completed, 0);
        assert_eq!(session.session_seconds, 0);
        assert!(!session.is_running);
    }

    #[test]
    fn test_pattern_change_while_running_resets() {
        let mut session = running(BreathingPattern::Beginner);
        for _ in 0..15 {
            session.tick();
        }
        session.set_pattern(BreathingPattern::Advanced);

        assert_eq!(session.pattern, BreathingPattern::Advanced);
        assert_eq!(session.phase, Phase::Inhale);
        assert_eq!(session.seconds_remaining, 6);
        assert_eq!(session.cycles_completed, 0);
        assert_eq!(session.session_seconds, 0);
        assert!(!session.is_running);
    }

    #[test]
    fn test_pattern_change_before_start_applies_to_next_start() {
        let mut session = BreathingSession::new(BreathingPattern::Beginner);
        session.set_pattern(BreathingPattern::Advanced);
        session.start();
        assert_eq!(session.seconds_remaining, 6);
    }

    #[test]
    fn test_pattern_change_while_paused_clamps_countdown() {
        let mut session = running(BreathingPattern::Advanced);
        for _ in 0..7 {
            session.tick();
        }
        // one second into Hold (6s), 5 remaining
        assert_eq!(session.phase, Phase::Hold);
        assert_eq!(session.seconds_remaining, 5);
        session.pause();

        session.set_pattern(BreathingPattern::Beginner);
        assert_eq!(session.phase, Phase::Hold);
        assert_eq!(session.seconds_remaining, 2);
        assert_eq!(session.session_seconds, 7);
    }

    #[test]
    fn test_completion_does_not_stop_the_session() {
        let mut session = running(BreathingPattern::Beginner);
        let cycle = BreathingPattern::Beginner.cycle_seconds();
        for _ in 0..cycle * SESSION_GOAL_CYCLES {
            session.tick();
        }
        assert!(session.is_complete());
        assert_eq!(session.points_earned(), SESSION_POINTS);
        assert!(session.is_running);

        for _ in 0..cycle {
            session.tick();
        }
        assert_eq!(session.cycles_completed, SESSION_GOAL_CYCLES + 1);
    }

    #[test]
    fn test_scale_follows_phase() {
        assert_eq!(scale_factor(Phase::Inhale), 1.5);
        assert_eq!(scale_factor(Phase::Hold), 1.5);
        assert_eq!(scale_factor(Phase::Exhale), 1.0);
        assert_eq!(scale_factor(Phase::Rest), 1.0);
    }

    #[test]
    fn test_pattern_names() {
        for pattern in BreathingPattern::ALL {
            assert_eq!(BreathingPattern::from_name(pattern.name()), Some(pattern));
        }
        assert_eq!(BreathingPattern::from_name("expert"), None);
        assert_eq!(BreathingPattern::Intermediate.label(), "4-4-6-2");
    }
}
