use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

/// Set of changes produced by a user action.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Event(u32);

impl Event {
    pub const NONE: Self = Self(0);

    /// The dragged axis moved.
    pub const AXIS_POSITION_CHANGE: Self = Self(1 << 0);
    /// The display order of the axes changed.
    pub const AXIS_ORDER_CHANGE: Self = Self(1 << 1);
    /// An axis drag ended.
    pub const AXIS_DROP: Self = Self(1 << 2);
    /// The live filter of an axis changed.
    pub const FILTER_CHANGE: Self = Self(1 << 3);
    /// A filter edit ended.
    pub const FILTER_COMMIT: Self = Self(1 << 4);

    pub fn has_events(&self) -> bool {
        *self != Self::NONE
    }

    pub fn signal(&mut self, event: Self) {
        *self |= event;
    }

    pub fn signaled(&self, event: Self) -> bool {
        (*self & event).has_events()
    }
}

impl BitAnd for Event {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

impl BitAndAssign for Event {
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl BitOr for Event {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Event {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl Not for Event {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self(!self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signals_accumulate() {
        let mut e = Event::NONE;
        assert!(!e.has_events());

        e.signal(Event::AXIS_POSITION_CHANGE);
        e.signal(Event::AXIS_ORDER_CHANGE);
        assert!(e.signaled(Event::AXIS_ORDER_CHANGE));
        assert!(!e.signaled(Event::FILTER_CHANGE));

        e &= !Event::AXIS_ORDER_CHANGE;
        assert_eq!(e, Event::AXIS_POSITION_CHANGE);
    }
}
