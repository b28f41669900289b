use crate::errors::BuildError;
use crate::re::hir::{ClassBytes, Group, Hir, Look, Repetition};
use crate::re::MAX_REPETITIONS;

use super::nfa::{
    LookSet, Nfa, State, StateId, Transition, DANGLING, MATCH,
};

/// Locates a transition whose target is [`DANGLING`].
#[derive(Clone, Copy, Debug)]
struct Hole {
    state: StateId,
    transition: usize,
    /// Index within the targets of a `Split` transition. Always zero for
    /// other transitions.
    slot: usize,
}

/// A piece of NFA under construction. `entry` is the first state in the
/// fragment, and `exits` are the transitions that must be patched with
/// the state that follows the fragment.
#[derive(Debug)]
struct Fragment {
    entry: StateId,
    exits: Vec<Hole>,
}

/// Compiles a [`Hir`] into a [`Nfa`] using Thompson's construction.
pub(crate) struct Compiler {
    size_limit: usize,
    states: Vec<State>,
    looks: LookSet,
    capture_names: Vec<Option<String>>,
}

impl Compiler {
    pub fn new() -> Self {
        Self {
            size_limit: usize::MAX,
            states: Vec::new(),
            looks: LookSet::default(),
            capture_names: Vec::new(),
        }
    }

    /// Maximum number of states in the resulting NFA.
    pub fn size_limit(mut self, limit: usize) -> Self {
        self.size_limit = limit;
        self
    }

    /// Compiles the regular expression represented by the given [`Hir`].
    pub fn compile(mut self, hir: &Hir) -> Result<Nfa, BuildError> {
        self.states.clear();
        self.add_state(vec![Transition::Match])?;

        let fragment = self.c(hir)?;
        self.patch(&fragment.exits, MATCH);

        let nfa = Nfa {
            states: self.states,
            start: fragment.entry,
            looks: self.looks,
            capture_names: self.capture_names,
        };

        nfa.validate();

        Ok(nfa)
    }
}

impl Compiler {
    fn c(&mut self, hir: &Hir) -> Result<Fragment, BuildError> {
        match hir {
            Hir::Empty => self.leaf(Transition::Epsilon(DANGLING)),
            Hir::Literal(byte) => self.leaf(Transition::Byte(*byte, DANGLING)),
            Hir::AnyByte => self.leaf(Transition::AnyByte(DANGLING)),
            Hir::Perl(perl) => self.c_class(&perl.to_class()),
            Hir::Class(class) => self.c_class(class),
            Hir::Look(look) => self.c_look(*look),
            Hir::Group(group) => self.c_group(group),
            Hir::Concat(items) => {
                let fragments = items
                    .iter()
                    .map(|item| self.c(item))
                    .collect::<Result<Vec<_>, _>>()?;
                self.c_concat(fragments)
            }
            Hir::Alternation(alternatives) => self.c_alternation(alternatives),
            Hir::Repetition(rep) => self.c_repetition(rep),
        }
    }

    fn add_state(
        &mut self,
        transitions: Vec<Transition>,
    ) -> Result<StateId, BuildError> {
        if self.states.len() >= self.size_limit {
            return Err(BuildError::TooLarge { limit: self.size_limit });
        }
        let id = self.states.len() as StateId;
        self.states.push(State { transitions });
        Ok(id)
    }

    /// Sets the target of every hole to `target`.
    fn patch(&mut self, holes: &[Hole], target: StateId) {
        for hole in holes {
            let slot = self.states[hole.state as usize].transitions
                [hole.transition]
                .target_mut(hole.slot);
            assert_eq!(*slot, DANGLING);
            *slot = target;
        }
    }

    /// Creates a state with a single dangling transition.
    fn leaf(&mut self, transition: Transition) -> Result<Fragment, BuildError> {
        let state = self.add_state(vec![transition])?;
        Ok(Fragment {
            entry: state,
            exits: vec![Hole { state, transition: 0, slot: 0 }],
        })
    }

    fn c_class(&mut self, class: &ClassBytes) -> Result<Fragment, BuildError> {
        let transitions = class
            .ranges()
            .iter()
            .map(|range| match (range.start, range.end) {
                (0x00, 0xFF) => Transition::AnyByte(DANGLING),
                (start, end) if start == end => {
                    Transition::Byte(start, DANGLING)
                }
                (start, end) => Transition::Range(start, end, DANGLING),
            })
            .collect::<Vec<_>>();

        let exits = (0..transitions.len()).collect::<Vec<_>>();
        let state = self.add_state(transitions)?;

        // An empty class produces a state without transitions, which
        // never matches.
        Ok(Fragment {
            entry: state,
            exits: exits
                .into_iter()
                .map(|transition| Hole { state, transition, slot: 0 })
                .collect(),
        })
    }

    fn c_look(&mut self, look: Look) -> Result<Fragment, BuildError> {
        self.looks.insert(look);
        self.leaf(Transition::Look(look, DANGLING))
    }

    fn c_group(&mut self, group: &Group) -> Result<Fragment, BuildError> {
        if let Some(index) = group.index {
            let index = index as usize;
            if self.capture_names.len() < index {
                self.capture_names.resize(index, None);
            }
            self.capture_names[index - 1] = group.name.clone();
        }
        self.c(&group.sub)
    }

    fn c_concat(
        &mut self,
        fragments: Vec<Fragment>,
    ) -> Result<Fragment, BuildError> {
        let mut iter = fragments.into_iter();

        let Some(first) = iter.next() else {
            return self.leaf(Transition::Epsilon(DANGLING));
        };

        let entry = first.entry;
        let mut exits = first.exits;

        for fragment in iter {
            self.patch(&exits, fragment.entry);
            exits = fragment.exits;
        }

        Ok(Fragment { entry, exits })
    }

    fn c_alternation(
        &mut self,
        alternatives: &[Hir],
    ) -> Result<Fragment, BuildError> {
        let mut entries = Vec::with_capacity(alternatives.len());
        let mut exits = Vec::new();

        for alternative in alternatives {
            let fragment = self.c(alternative)?;
            entries.push(fragment.entry);
            exits.extend(fragment.exits);
        }

        let split = self.add_state(vec![Transition::Split(entries)])?;

        Ok(Fragment { entry: split, exits })
    }

    fn c_repetition(
        &mut self,
        rep: &Repetition,
    ) -> Result<Fragment, BuildError> {
        if rep.min > MAX_REPETITIONS
            || rep.max.is_some_and(|max| max > MAX_REPETITIONS)
        {
            return Err(BuildError::RepetitionTooLarge {
                max: MAX_REPETITIONS,
            });
        }

        match (rep.min, rep.max) {
            (0, Some(0)) => self.leaf(Transition::Epsilon(DANGLING)),
            (0, None) => self.c_star(&rep.sub),
            (1, None) => self.c_plus(&rep.sub),
            (min, None) => {
                // e{min,} is expressed as e{min-1}e+
                let mut fragments = Vec::with_capacity(min as usize);
                for _ in 0..min - 1 {
                    fragments.push(self.c(&rep.sub)?);
                }
                fragments.push(self.c_plus(&rep.sub)?);
                self.c_concat(fragments)
            }
            (min, Some(max)) => {
                // e{min,max} is expressed as e{min}(e(e(e)?)?)?, where
                // the number of nested optionals is max - min.
                let mut fragments = Vec::with_capacity(min as usize + 1);
                for _ in 0..min {
                    fragments.push(self.c(&rep.sub)?);
                }
                if max > min {
                    fragments.push(self.c_optionals(&rep.sub, max - min)?);
                }
                self.c_concat(fragments)
            }
        }
    }

    fn c_star(&mut self, sub: &Hir) -> Result<Fragment, BuildError> {
        let fragment = self.c(sub)?;
        let split = self.add_state(vec![Transition::Split(vec![
            fragment.entry,
            DANGLING,
        ])])?;
        self.patch(&fragment.exits, split);
        Ok(Fragment {
            entry: split,
            exits: vec![Hole { state: split, transition: 0, slot: 1 }],
        })
    }

    fn c_plus(&mut self, sub: &Hir) -> Result<Fragment, BuildError> {
        let fragment = self.c(sub)?;
        let split = self.add_state(vec![Transition::Split(vec![
            fragment.entry,
            DANGLING,
        ])])?;
        self.patch(&fragment.exits, split);
        Ok(Fragment {
            entry: fragment.entry,
            exits: vec![Hole { state: split, transition: 0, slot: 1 }],
        })
    }

    /// Produces `n` nested optionals, as in `(e(e(e)?)?)?`.
    fn c_optionals(
        &mut self,
        sub: &Hir,
        n: u32,
    ) -> Result<Fragment, BuildError> {
        let mut entry = None;
        let mut exits = Vec::new();
        let mut pending: Vec<Hole> = Vec::new();

        for _ in 0..n {
            let fragment = self.c(sub)?;
            let split = self.add_state(vec![Transition::Split(vec![
                fragment.entry,
                DANGLING,
            ])])?;
            match entry {
                None => entry = Some(split),
                Some(_) => self.patch(&pending, split),
            }
            exits.push(Hole { state: split, transition: 0, slot: 1 });
            pending = fragment.exits;
        }

        exits.extend(pending);

        match entry {
            Some(entry) => Ok(Fragment { entry, exits }),
            None => self.leaf(Transition::Epsilon(DANGLING)),
        }
    }
}
