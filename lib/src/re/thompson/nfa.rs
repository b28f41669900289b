use std::fmt::{Display, Formatter};

use crate::re::bitmapset::BitmapSet;
use crate::re::hir::{ByteSet, Look};

/// Identifies a state within a [`Nfa`]. It's the index of the state in
/// the NFA's state vector.
pub(crate) type StateId = u32;

/// The state that accepts the input. It's always the first state in a NFA.
pub(crate) const MATCH: StateId = 0;

/// Target used while the NFA is being built, for transitions whose
/// destination is not known yet.
pub(crate) const DANGLING: StateId = StateId::MAX;

/// A transition from one NFA state to another one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Transition {
    /// Consumes the given byte.
    Byte(u8, StateId),
    /// Consumes any byte in the inclusive range.
    Range(u8, u8, StateId),
    /// Consumes any byte.
    AnyByte(StateId),
    /// Moves to the target without consuming input.
    Epsilon(StateId),
    /// Moves to all the targets without consuming input.
    Split(Vec<StateId>),
    /// Moves to the target without consuming input, but only if the
    /// assertion holds at the current position.
    Look(Look, StateId),
    /// The input is accepted.
    Match,
}

impl Transition {
    /// If the transition consumes `byte`, returns its target.
    #[inline]
    pub fn step(&self, byte: u8) -> Option<StateId> {
        match self {
            Transition::Byte(b, target) if *b == byte => Some(*target),
            Transition::Range(lo, hi, target) if *lo <= byte && byte <= *hi => {
                Some(*target)
            }
            Transition::AnyByte(target) => Some(*target),
            _ => None,
        }
    }

    fn targets(&self) -> &[StateId] {
        match self {
            Transition::Byte(_, target)
            | Transition::Range(_, _, target)
            | Transition::AnyByte(target)
            | Transition::Epsilon(target)
            | Transition::Look(_, target) => std::slice::from_ref(target),
            Transition::Split(targets) => targets.as_slice(),
            Transition::Match => &[],
        }
    }

    pub(super) fn target_mut(&mut self, slot: usize) -> &mut StateId {
        match self {
            Transition::Byte(_, target)
            | Transition::Range(_, _, target)
            | Transition::AnyByte(target)
            | Transition::Epsilon(target)
            | Transition::Look(_, target) => target,
            Transition::Split(targets) => &mut targets[slot],
            Transition::Match => unreachable!("MATCH has no targets"),
        }
    }
}

/// Kinds of states. Each state in the NFA has transitions of a single kind,
/// with the exception of byte-consuming states, which can have several
/// `Byte`, `Range` or `AnyByte` transitions (one per range in a class).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StateKind {
    /// The state consumes one byte.
    Consuming,
    /// The state has only `Epsilon` or `Split` transitions.
    Epsilon,
    /// The state is a zero-width assertion.
    Look(Look),
    /// The accepting state.
    Match,
    /// A state without transitions. It never matches.
    Fail,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct State {
    pub transitions: Vec<Transition>,
}

impl State {
    pub fn kind(&self) -> StateKind {
        match self.transitions.first() {
            None => StateKind::Fail,
            Some(Transition::Match) => StateKind::Match,
            Some(Transition::Look(look, _)) => StateKind::Look(*look),
            Some(Transition::Epsilon(_)) | Some(Transition::Split(_)) => {
                StateKind::Epsilon
            }
            Some(_) => StateKind::Consuming,
        }
    }
}

/// The set of assertions used by a NFA.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct LookSet(u8);

impl LookSet {
    #[inline]
    pub fn insert(&mut self, look: Look) {
        self.0 |= 1 << look as u8;
    }

    #[inline]
    pub fn contains(&self, look: Look) -> bool {
        self.0 & (1 << look as u8) != 0
    }
}

/// A non-deterministic finite automaton produced by the Thompson compiler.
///
/// The NFA is read-only once built.
#[derive(Clone, Debug)]
pub(crate) struct Nfa {
    pub(super) states: Vec<State>,
    pub(super) start: StateId,
    pub(super) looks: LookSet,
    pub(super) capture_names: Vec<Option<String>>,
}

impl Nfa {
    /// Returns the state with the given id.
    #[inline]
    pub fn state(&self, id: StateId) -> &State {
        &self.states[id as usize]
    }

    /// Number of states in the NFA.
    #[inline]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[inline]
    pub fn start(&self) -> StateId {
        self.start
    }

    /// Assertions used by the NFA.
    #[inline]
    pub fn looks(&self) -> LookSet {
        self.looks
    }

    /// Number of capturing groups in the regexp.
    #[inline]
    pub fn captures_len(&self) -> usize {
        self.capture_names.len()
    }

    /// Names of the capturing groups, in the order in which they appear
    /// in the regexp. Unnamed groups are `None`.
    pub fn capture_names(&self) -> impl Iterator<Item = Option<&str>> {
        self.capture_names.iter().map(|name| name.as_deref())
    }

    /// Checks that every transition points to an existing state.
    ///
    /// # Panics
    ///
    /// If any target is [`DANGLING`] or out of bounds.
    pub fn validate(&self) {
        assert_eq!(self.states[MATCH as usize].kind(), StateKind::Match);
        for (id, state) in self.states.iter().enumerate() {
            for transition in &state.transitions {
                for target in transition.targets() {
                    assert_ne!(
                        *target, DANGLING,
                        "dangling transition in state {id}"
                    );
                    assert!(
                        (*target as usize) < self.states.len(),
                        "state {id} points to unknown state {target}"
                    );
                }
            }
        }
    }

    /// Returns the set of bytes that can start a match, or `None` if the
    /// regexp can match an empty string.
    ///
    /// Assertions are assumed to hold, so the result is a superset of the
    /// bytes that can actually start a match at any given position.
    pub fn first_bytes(&self) -> Option<ByteSet> {
        let mut visited = BitmapSet::with_capacity(self.states.len());
        let mut stack = vec![self.start];
        let mut bytes = ByteSet::empty();

        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            for transition in &self.state(id).transitions {
                match transition {
                    Transition::Match => return None,
                    Transition::Byte(b, _) => bytes.insert(*b),
                    Transition::Range(lo, hi, _) => {
                        (*lo..=*hi).for_each(|b| bytes.insert(b))
                    }
                    Transition::AnyByte(_) => {
                        (0..=u8::MAX).for_each(|b| bytes.insert(b))
                    }
                    Transition::Epsilon(target)
                    | Transition::Look(_, target) => stack.push(*target),
                    Transition::Split(targets) => {
                        stack.extend(targets.iter().rev())
                    }
                }
            }
        }

        Some(bytes)
    }
}

impl Display for Nfa {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let target = |t: &StateId| {
            if *t == DANGLING {
                "?".to_string()
            } else {
                t.to_string()
            }
        };

        for (id, state) in self.states.iter().enumerate() {
            write!(f, "{:02}:", id)?;
            if state.transitions.is_empty() {
                write!(f, " FAIL")?;
            }
            for (i, transition) in state.transitions.iter().enumerate() {
                if i > 0 {
                    write!(f, " |")?;
                }
                match transition {
                    Transition::Byte(b, t) => {
                        write!(f, " BYTE {:#04x} -> {}", b, target(t))?
                    }
                    Transition::Range(lo, hi, t) => write!(
                        f,
                        " RANGE {:#04x}-{:#04x} -> {}",
                        lo,
                        hi,
                        target(t)
                    )?,
                    Transition::AnyByte(t) => {
                        write!(f, " ANY -> {}", target(t))?
                    }
                    Transition::Epsilon(t) => {
                        write!(f, " EPS -> {}", target(t))?
                    }
                    Transition::Split(targets) => write!(
                        f,
                        " SPLIT {}",
                        targets.iter().map(target).collect::<Vec<_>>().join(", ")
                    )?,
                    Transition::Look(look, t) => {
                        write!(f, " LOOK {:?} -> {}", look, target(t))?
                    }
                    Transition::Match => write!(f, " MATCH")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
