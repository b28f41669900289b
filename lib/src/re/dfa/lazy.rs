use bitvec::array::BitArray;
use log::{debug, trace};
use rustc_hash::FxHashMap;

use crate::re::bitmapset::BitmapSet;
use crate::re::hir::{is_word_byte, Look};
use crate::re::thompson::{
    Nfa, StateId as NfaStateId, StateKind, Transition, MATCH,
};

/// Identifies a state within a [`LazyDfa`].
pub(crate) type StateId = u32;

/// The state from which no match is possible. Every transition from this
/// state goes back to itself.
pub(crate) const DEAD: StateId = 0;

/// The state where the DFA starts when matching at the beginning of the
/// input.
pub(crate) const START: StateId = 1;

/// Marks the entries in the transition table that haven't been computed
/// yet.
const UNKNOWN: StateId = StateId::MAX;

/// The position being examined is the start of the input.
const AT_START: u8 = 0b001;
/// The byte before the position being examined is a word byte.
const PREV_WORD: u8 = 0b010;
/// The byte before the position being examined is `\n`.
const PREV_NEWLINE: u8 = 0b100;

/// Statistics about the states in a [`LazyDfa`] cache.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DfaStats {
    /// Number of DFA states currently in the cache.
    pub states: usize,
    /// Number of times the cache has been cleared because it exceeded its
    /// limit.
    pub clears: usize,
}

/// Information about the position at which look-around assertions are
/// evaluated: what comes before it (as a combination of `AT_START`,
/// `PREV_WORD` and `PREV_NEWLINE`) and the next byte, which is `None` at
/// the end of the input. `last` is true when the next byte is the last
/// one in the input.
#[derive(Clone, Copy, Debug)]
struct LookContext {
    flags: u8,
    next: Option<u8>,
    last: bool,
}

impl LookContext {
    fn holds(&self, look: Look) -> bool {
        match look {
            Look::StartText => self.flags & AT_START != 0,
            Look::EndText => self.next.is_none(),
            Look::EndTextOrFinalNewline => match self.next {
                None => true,
                Some(b'\n') => self.last,
                Some(_) => false,
            },
            Look::StartLine => self.flags & (AT_START | PREV_NEWLINE) != 0,
            Look::EndLine => matches!(self.next, None | Some(b'\n')),
            Look::WordBoundary => {
                (self.flags & PREV_WORD != 0)
                    != self.next.is_some_and(is_word_byte)
            }
            Look::NotWordBoundary => {
                (self.flags & PREV_WORD != 0)
                    == self.next.is_some_and(is_word_byte)
            }
        }
    }
}

struct DfaState {
    /// Sorted ids of the NFA states represented by this DFA state. Only
    /// states that consume input, the MATCH state, and assertions that
    /// couldn't be resolved yet are included.
    nfa_states: Box<[NfaStateId]>,
    /// Context flags that assertions in `nfa_states` depend on. Always
    /// zero when there are no assertions.
    flags: u8,
    /// Next state for each possible byte.
    next: Box<[StateId; 256]>,
    /// The N-th bit is set if the DFA matches right before the byte N.
    match_before: BitArray<[u64; 4]>,
    /// Whether the DFA matches at the end of the input. `None` until
    /// computed.
    eoi: Option<bool>,
    /// Next state when the byte being consumed is a `\n` that ends the
    /// input, and whether the DFA matches right before it. Only used when
    /// the NFA contains `Look::EndTextOrFinalNewline`.
    final_newline: Option<(StateId, bool)>,
}

impl DfaState {
    fn new(nfa_states: Box<[NfaStateId]>, flags: u8) -> Self {
        Self {
            nfa_states,
            flags,
            next: Box::new([UNKNOWN; 256]),
            match_before: BitArray::ZERO,
            eoi: None,
            final_newline: None,
        }
    }
}

/// A DFA built lazily from a [`Nfa`].
///
/// DFA states are created on demand while matching, and cached so that
/// subsequent searches can reuse them. The number of cached states is
/// bounded: when the cache grows beyond its limit it is cleared before the
/// next search starts, so the same DFA can be used for scanning any amount
/// of data with a bounded amount of memory.
///
/// The DFA doesn't own the NFA, the same [`Nfa`] must be passed to every
/// method that receives one.
pub(crate) struct LazyDfa {
    states: Vec<DfaState>,
    map: FxHashMap<(Box<[NfaStateId]>, u8), StateId>,
    /// Start states for each combination of context flags.
    starts: [Option<StateId>; 8],
    /// Context flags that have some effect on the NFA's assertions.
    used_flags: u8,
    /// The NFA contains `Look::EndTextOrFinalNewline`.
    final_newline: bool,
    cache_limit: usize,
    clears: usize,
    // Scratch space used while computing new states.
    closure: BitmapSet,
    stack: Vec<NfaStateId>,
    targets: Vec<NfaStateId>,
}

impl LazyDfa {
    pub fn new(nfa: &Nfa) -> Self {
        let looks = nfa.looks();
        let mut used_flags = 0;

        if looks.contains(Look::StartText) {
            used_flags |= AT_START;
        }
        if looks.contains(Look::StartLine) {
            used_flags |= AT_START | PREV_NEWLINE;
        }
        if looks.contains(Look::WordBoundary)
            || looks.contains(Look::NotWordBoundary)
        {
            used_flags |= PREV_WORD;
        }

        let mut dfa = Self {
            states: Vec::new(),
            map: FxHashMap::default(),
            starts: [None; 8],
            used_flags,
            final_newline: looks.contains(Look::EndTextOrFinalNewline),
            cache_limit: usize::MAX,
            clears: 0,
            closure: BitmapSet::with_capacity(nfa.len()),
            stack: Vec::new(),
            targets: Vec::new(),
        };

        dfa.init(nfa);
        dfa
    }

    /// Maximum number of states kept in the cache.
    pub fn cache_limit(mut self, limit: usize) -> Self {
        self.cache_limit = limit;
        self
    }

    pub fn stats(&self) -> DfaStats {
        DfaStats { states: self.states.len(), clears: self.clears }
    }

    /// Finds the longest match that starts exactly at `start`, and returns
    /// the offset where it ends.
    ///
    /// Bytes before `start` are taken into account only for evaluating
    /// assertions like `^` and `\b`.
    pub fn find_at(
        &mut self,
        nfa: &Nfa,
        text: &[u8],
        start: usize,
    ) -> Option<usize> {
        if self.states.len() > self.cache_limit {
            self.clear_cache(nfa);
        }

        let mut state = self.start_state(nfa, text, start);
        let mut best = None;

        for (pos, byte) in text.iter().enumerate().skip(start) {
            let (next, matches_before) = if self.final_newline
                && *byte == b'\n'
                && pos + 1 == text.len()
            {
                self.final_newline_step(nfa, state)
            } else {
                let next = self.next_state(nfa, state, *byte);
                let current = &self.states[state as usize];
                (next, current.match_before[*byte as usize])
            };
            if matches_before {
                best = Some(pos);
            }
            if next == DEAD {
                return best;
            }
            state = next;
        }

        if self.eoi_match(nfa, state) {
            best = Some(text.len());
        }

        best
    }

    /// Returns the state reached from `state` after consuming `byte`.
    #[inline]
    fn next_state(&mut self, nfa: &Nfa, state: StateId, byte: u8) -> StateId {
        match self.states[state as usize].next[byte as usize] {
            UNKNOWN => {
                let (next, matches_before) =
                    self.compute_next_state(nfa, state, byte, false);
                let current = &mut self.states[state as usize];
                current.next[byte as usize] = next;
                current.match_before.set(byte as usize, matches_before);
                next
            }
            next => next,
        }
    }

    /// Same as [`LazyDfa::next_state`] for a `\n` that is the last byte of
    /// the input, but also returns whether the DFA matches before it.
    fn final_newline_step(
        &mut self,
        nfa: &Nfa,
        state: StateId,
    ) -> (StateId, bool) {
        if let Some(step) = self.states[state as usize].final_newline {
            return step;
        }
        let step = self.compute_next_state(nfa, state, b'\n', true);
        self.states[state as usize].final_newline = Some(step);
        step
    }

    /// Returns true if `state` matches at the end of the input.
    fn eoi_match(&mut self, nfa: &Nfa, state: StateId) -> bool {
        if let Some(eoi) = self.states[state as usize].eoi {
            return eoi;
        }

        let ctx = LookContext {
            flags: self.states[state as usize].flags,
            next: None,
            last: false,
        };

        epsilon_closure(
            nfa,
            self.states[state as usize].nfa_states.iter().copied(),
            Some(ctx),
            &mut self.closure,
            &mut self.stack,
        );

        let eoi = self.closure.contains(MATCH);
        self.closure.clear();
        self.states[state as usize].eoi = Some(eoi);

        eoi
    }

    /// Computes the state reached from `state` after consuming `byte`,
    /// and whether the DFA matches right before `byte`. `last` indicates
    /// whether `byte` is the last byte in the input.
    fn compute_next_state(
        &mut self,
        nfa: &Nfa,
        state: StateId,
        byte: u8,
        last: bool,
    ) -> (StateId, bool) {
        let current = &self.states[state as usize];
        let ctx = LookContext { flags: current.flags, next: Some(byte), last };

        // Resolve the assertions that depend on the byte that comes next.
        epsilon_closure(
            nfa,
            current.nfa_states.iter().copied(),
            Some(ctx),
            &mut self.closure,
            &mut self.stack,
        );

        let matches_before = self.closure.contains(MATCH);

        self.targets.clear();
        for id in self.closure.iter() {
            for transition in &nfa.state(id).transitions {
                if let Some(target) = transition.step(byte) {
                    self.targets.push(target);
                }
            }
        }

        self.closure.clear();

        epsilon_closure(
            nfa,
            self.targets.iter().copied(),
            None,
            &mut self.closure,
            &mut self.stack,
        );

        let mut flags = 0;
        if is_word_byte(byte) {
            flags |= PREV_WORD;
        }
        if byte == b'\n' {
            flags |= PREV_NEWLINE;
        }

        (self.intern_closure(nfa, flags), matches_before)
    }

    /// Returns the start state for a search that begins at `start`.
    fn start_state(&mut self, nfa: &Nfa, text: &[u8], start: usize) -> StateId {
        let flags = if start == 0 {
            AT_START
        } else {
            let prev = text[start - 1];
            let mut flags = 0;
            if is_word_byte(prev) {
                flags |= PREV_WORD;
            }
            if prev == b'\n' {
                flags |= PREV_NEWLINE;
            }
            flags
        };

        let flags = flags & self.used_flags;

        if let Some(id) = self.starts[flags as usize] {
            return id;
        }

        epsilon_closure(
            nfa,
            [nfa.start()],
            None,
            &mut self.closure,
            &mut self.stack,
        );

        let id = self.intern_closure(nfa, flags);
        self.starts[flags as usize] = Some(id);
        id
    }

    /// Returns the DFA state that corresponds to the NFA states currently
    /// in the closure, creating it if it doesn't exist. The closure is
    /// cleared.
    fn intern_closure(&mut self, nfa: &Nfa, flags: u8) -> StateId {
        let mut has_looks = false;
        let mut nfa_states = self
            .closure
            .iter()
            .filter(|id| match nfa.state(*id).kind() {
                StateKind::Consuming | StateKind::Match => true,
                StateKind::Look(_) => {
                    has_looks = true;
                    true
                }
                StateKind::Epsilon | StateKind::Fail => false,
            })
            .collect::<Vec<_>>();

        self.closure.clear();

        if nfa_states.is_empty() {
            return DEAD;
        }

        nfa_states.sort_unstable();

        let flags = if has_looks { flags & self.used_flags } else { 0 };
        let key = (nfa_states.into_boxed_slice(), flags);

        if let Some(id) = self.map.get(&key) {
            return *id;
        }

        let id = self.states.len() as StateId;
        trace!("new DFA state {}: {:?} (flags: {:#05b})", id, key.0, flags);
        self.states.push(DfaState::new(key.0.clone(), flags));
        self.map.insert(key, id);

        id
    }

    /// Creates the DEAD and START states.
    fn init(&mut self, nfa: &Nfa) {
        self.states.push(DfaState::new(Box::new([]), 0));
        self.states[DEAD as usize].next.fill(DEAD);
        self.states[DEAD as usize].eoi = Some(false);

        let start = self.start_state(nfa, &[], 0);

        // When the NFA can't match anything the start state is DEAD, but
        // START must exist anyway.
        if start == DEAD {
            self.states.push(DfaState::new(Box::new([]), 0));
            self.states[START as usize].next.fill(DEAD);
            self.states[START as usize].eoi = Some(false);
            self.starts[(AT_START & self.used_flags) as usize] = Some(START);
        }

        debug_assert_eq!(self.states.len(), 2);
    }

    fn clear_cache(&mut self, nfa: &Nfa) {
        debug!(
            "clearing DFA cache ({} states, limit: {})",
            self.states.len(),
            self.cache_limit
        );
        self.states.clear();
        self.map.clear();
        self.starts = [None; 8];
        self.clears += 1;
        self.init(nfa);
    }
}

/// Computes the epsilon closure of the given NFA states, and stores it in
/// `closure`.
///
/// In a NFA, the epsilon closure of some state `S` is the set containing all
/// the states that can be reached from `S` by following transitions that
/// don't consume any input. When `ctx` is `None`, assertions are not
/// evaluated, the states containing them are added to the closure and not
/// followed. When `ctx` is provided, assertions that hold in that context
/// are followed, and the rest are discarded.
///
/// `closure` must be empty. `stack` is scratch space that is left empty
/// when the function returns.
fn epsilon_closure<I>(
    nfa: &Nfa,
    roots: I,
    ctx: Option<LookContext>,
    closure: &mut BitmapSet,
    stack: &mut Vec<NfaStateId>,
) where
    I: IntoIterator<Item = NfaStateId>,
{
    debug_assert!(closure.is_empty());
    for root in roots {
        stack.push(root);
        while let Some(id) = stack.pop() {
            if !closure.insert(id) {
                continue;
            }
            for transition in nfa.state(id).transitions.iter().rev() {
                match transition {
                    Transition::Epsilon(target) => stack.push(*target),
                    Transition::Split(targets) => {
                        stack.extend(targets.iter().rev())
                    }
                    Transition::Look(look, target) => {
                        if ctx.is_some_and(|ctx| ctx.holds(*look)) {
                            stack.push(*target)
                        }
                    }
                    _ => {}
                }
            }
        }
    }
}
