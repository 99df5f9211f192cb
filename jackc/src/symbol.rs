//! Two level symbol table.
use std::{collections::HashMap, fmt};

use log::trace;
use smol_str::SmolStr;

use crate::{constants::INT_MAX, vm_writer::Segment};

/// Storage classification of a declared name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Class level, shared by all instances.
    Static,
    /// Class level, one per instance.
    Field,
    /// Subroutine parameter.
    Argument,
    /// Subroutine local variable.
    Local,
}

impl Kind {
    /// Memory segment the kind is stored in.
    #[rustfmt::skip]
    pub fn segment(&self) -> Segment {
        match self {
            Self::Static   => Segment::Static,
            Self::Field    => Segment::This,
            Self::Argument => Segment::Argument,
            Self::Local    => Segment::Local,
        }
    }

    /// Whether the kind lives in the class scope, as opposed to
    /// the subroutine scope.
    #[inline]
    pub fn is_class_scope(&self) -> bool {
        matches!(self, Self::Static | Self::Field)
    }

    #[inline]
    fn counter_index(&self) -> usize {
        match self {
            Self::Static => 0,
            Self::Field => 1,
            Self::Argument => 2,
            Self::Local => 3,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Static => write!(f, "static"),
            Self::Field => write!(f, "field"),
            Self::Argument => write!(f, "argument"),
            Self::Local => write!(f, "local"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// Declared type, either a primitive or a class name.
    pub ty: SmolStr,
    pub kind: Kind,
    /// Running index, unique within the kind and scope.
    pub index: u16,
}

/// Symbol table with a class scope and a subroutine scope.
///
/// Lookups try the subroutine scope first, then fall back to the class scope.
#[derive(Debug, Default)]
pub struct SymbolTable {
    class: HashMap<SmolStr, Symbol>,
    subroutine: HashMap<SmolStr, Symbol>,
    /// Running count per kind, in the order of [`Kind::counter_index`].
    counters: [u16; 4],
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new subroutine scope, forgetting all arguments and locals.
    ///
    /// The class scope is left untouched.
    pub fn start_subroutine(&mut self) {
        self.subroutine.clear();
        self.counters[Kind::Argument.counter_index()] = 0;
        self.counters[Kind::Local.counter_index()] = 0;
    }

    /// Define a new name and assign it the next running index of its kind.
    ///
    /// Redefining a name in the same scope replaces the earlier entry.
    /// Returns the assigned index, or `None` without defining anything
    /// when the kind already holds [`INT_MAX`] names, since counts are
    /// pushed as integer constants.
    pub fn define(
        &mut self,
        name: impl Into<SmolStr>,
        ty: impl Into<SmolStr>,
        kind: Kind,
    ) -> Option<u16> {
        let counter = &mut self.counters[kind.counter_index()];
        if *counter >= INT_MAX {
            return None;
        }

        let name = name.into();
        let symbol = Symbol {
            ty: ty.into(),
            kind,
            index: *counter,
        };
        *counter += 1;

        trace!("define {} {} {} {}", kind, symbol.ty, name, symbol.index);

        let index = symbol.index;
        if kind.is_class_scope() {
            self.class.insert(name, symbol);
        } else {
            self.subroutine.insert(name, symbol);
        }

        Some(index)
    }

    /// Number of names defined so far with the given kind in its current scope.
    #[inline]
    pub fn var_count(&self, kind: Kind) -> u16 {
        self.counters[kind.counter_index()]
    }

    /// Resolve a name, subroutine scope first.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.subroutine.get(name).or_else(|| self.class.get(name))
    }

    #[inline]
    pub fn kind_of(&self, name: &str) -> Option<Kind> {
        self.lookup(name).map(|symbol| symbol.kind)
    }

    #[inline]
    pub fn type_of(&self, name: &str) -> Option<&str> {
        self.lookup(name).map(|symbol| symbol.ty.as_str())
    }

    #[inline]
    pub fn index_of(&self, name: &str) -> Option<u16> {
        self.lookup(name).map(|symbol| symbol.index)
    }
}
