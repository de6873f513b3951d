#![forbid(unsafe_code)]

//! Tracking declarations and the per-instance tracked-member registry.
//!
//! A component type declares, once, which of its members take part in dirty
//! checking and how, by building a [`TrackingSpec`]:
//!
//! | Kind                            | Contract                                        |
//! |---------------------------------|-------------------------------------------------|
//! | field / getter / accessor       | polled once per tick, redraw on change (lazy)   |
//! | setter / method                 | redraw right after the call returns (eager)     |
//! | render                          | the render output is diffed every tick          |
//!
//! Each mounted instance owns a [`TrackedMemberRegistry`] built from that
//! spec. It keeps the ordered set of lazily polled names and the last value
//! observed for each of them.
//!
//! # Invariants
//!
//! 1. Lazy names are unique and kept in declaration order.
//! 2. The first observation of a name records a baseline and never reports a
//!    change.
//! 3. A name starting with [`PRIVATE_SIGIL`] is rejected when observed, not
//!    when declared.

use std::rc::Rc;

use ahash::AHashMap;
use bitflags::bitflags;
use framewatch_core::Value;

use crate::error::{Result, TrackError};

/// Prefix reserved for private members.
pub const PRIVATE_SIGIL: char = '#';

/// Member name that marks a method declaration as the render method.
pub const RENDER_METHOD: &str = "render";

/// A member name shared between a [`TrackingSpec`] and the registry.
pub type MemberName = Rc<str>;

/// How a single member is tracked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Field,
    Getter,
    Accessor,
    Setter,
    Method,
    Render,
}

impl MemberKind {
    #[must_use]
    pub const fn flag(self) -> MemberKinds {
        match self {
            Self::Field => MemberKinds::FIELD,
            Self::Getter => MemberKinds::GETTER,
            Self::Accessor => MemberKinds::ACCESSOR,
            Self::Setter => MemberKinds::SETTER,
            Self::Method => MemberKinds::METHOD,
            Self::Render => MemberKinds::RENDER,
        }
    }

    /// Whether values of this kind are polled each tick.
    #[must_use]
    pub const fn is_lazy(self) -> bool {
        self.flag().intersects(MemberKinds::LAZY)
    }

    /// Whether calls through this kind request a redraw immediately.
    #[must_use]
    pub const fn is_eager(self) -> bool {
        self.flag().intersects(MemberKinds::EAGER)
    }
}

bitflags! {
    /// Set of kinds declared for one name.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct MemberKinds: u8 {
        const FIELD    = 0b0000_0001;
        const GETTER   = 0b0000_0010;
        const ACCESSOR = 0b0000_0100;
        const SETTER   = 0b0000_1000;
        const METHOD   = 0b0001_0000;
        const RENDER   = 0b0010_0000;

        const LAZY  = Self::FIELD.bits() | Self::GETTER.bits() | Self::ACCESSOR.bits();
        const EAGER = Self::SETTER.bits() | Self::METHOD.bits();
    }
}

/// One `{ name, kind }` declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackedMember {
    pub name: MemberName,
    pub kind: MemberKind,
}

impl TrackedMember {
    /// Declare `name` with `kind`. A method named [`RENDER_METHOD`] becomes
    /// the render declaration.
    pub fn new(name: &str, kind: MemberKind) -> Self {
        let kind = if kind == MemberKind::Method && name == RENDER_METHOD {
            MemberKind::Render
        } else {
            kind
        };
        Self {
            name: Rc::from(name),
            kind,
        }
    }

    /// Whether the name uses the private-member sigil.
    #[must_use]
    pub fn is_private(&self) -> bool {
        self.name.starts_with(PRIVATE_SIGIL)
    }
}

/// Static tracking configuration of a component type.
///
/// ```
/// use framewatch_runtime::tracking::{MemberKinds, TrackingSpec};
///
/// let spec = TrackingSpec::new()
///     .field("count")
///     .getter("label")
///     .setter("value")
///     .method("reset")
///     .render();
///
/// assert!(spec.tracks_render());
/// assert_eq!(spec.lazy_names().collect::<Vec<_>>(), ["count", "label"]);
/// assert!(spec.kinds_of("reset").contains(MemberKinds::METHOD));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrackingSpec {
    members: Vec<TrackedMember>,
}

impl TrackingSpec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a declaration.
    #[must_use]
    pub fn with(mut self, name: &str, kind: MemberKind) -> Self {
        self.push(TrackedMember::new(name, kind));
        self
    }

    /// Add a declaration in place. Exact duplicates are ignored.
    pub fn push(&mut self, member: TrackedMember) {
        if !self.members.contains(&member) {
            self.members.push(member);
        }
    }

    #[must_use]
    pub fn field(self, name: &str) -> Self {
        self.with(name, MemberKind::Field)
    }

    #[must_use]
    pub fn getter(self, name: &str) -> Self {
        self.with(name, MemberKind::Getter)
    }

    #[must_use]
    pub fn accessor(self, name: &str) -> Self {
        self.with(name, MemberKind::Accessor)
    }

    #[must_use]
    pub fn setter(self, name: &str) -> Self {
        self.with(name, MemberKind::Setter)
    }

    #[must_use]
    pub fn method(self, name: &str) -> Self {
        self.with(name, MemberKind::Method)
    }

    /// Track the render output.
    #[must_use]
    pub fn render(self) -> Self {
        self.with(RENDER_METHOD, MemberKind::Render)
    }

    /// All declarations in order.
    #[must_use]
    pub fn members(&self) -> &[TrackedMember] {
        &self.members
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether the render output is diffed every tick.
    #[must_use]
    pub fn tracks_render(&self) -> bool {
        self.members.iter().any(|m| m.kind == MemberKind::Render)
    }

    /// Every kind declared for `name`.
    #[must_use]
    pub fn kinds_of(&self, name: &str) -> MemberKinds {
        self.members
            .iter()
            .filter(|m| &*m.name == name)
            .fold(MemberKinds::empty(), |acc, m| acc | m.kind.flag())
    }

    /// Whether calls through `name` request a redraw right away.
    #[must_use]
    pub fn is_eager(&self, name: &str) -> bool {
        self.kinds_of(name).intersects(MemberKinds::EAGER)
    }

    /// Lazily polled names, de-duplicated, in declaration order.
    pub fn lazy_names(&self) -> impl Iterator<Item = &str> + '_ {
        let mut seen: Vec<&str> = Vec::new();
        self.members.iter().filter_map(move |m| {
            if !m.kind.is_lazy() || seen.contains(&&*m.name) {
                return None;
            }
            seen.push(&m.name);
            Some(&*m.name)
        })
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Result of observing a tracked member's current value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Observation {
    /// First observation since mount; recorded without requesting a redraw.
    Baseline,
    Unchanged,
    /// The cache was updated with the new value.
    Changed,
}

/// What one [`TrackedMemberRegistry::poll`] pass found.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PollReport {
    /// Names whose value changed. Baselines do not count.
    pub changed: usize,
    /// Set when polling stopped at a private name.
    pub error: Option<TrackError>,
}

impl PollReport {
    /// The change count, or the error that stopped polling.
    ///
    /// # Errors
    ///
    /// [`TrackError::PrivateMember`] when a private name was reached.
    pub fn into_result(self) -> Result<usize> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.changed),
        }
    }
}

/// Per-instance bookkeeping of lazily tracked members.
#[derive(Debug, Default)]
pub struct TrackedMemberRegistry {
    names: Vec<MemberName>,
    last_values: AHashMap<MemberName, Value>,
    render_tracked: bool,
}

impl TrackedMemberRegistry {
    /// Build the registry of one instance from its type's spec.
    #[must_use]
    pub fn from_spec(spec: &TrackingSpec) -> Self {
        let mut registry = Self {
            render_tracked: spec.tracks_render(),
            ..Self::default()
        };
        for name in spec.lazy_names() {
            registry.track(name);
        }
        registry
    }

    /// Add a lazily polled name. Returns `false` if it was already tracked.
    pub fn track(&mut self, name: &str) -> bool {
        if self.is_tracked(name) {
            return false;
        }
        self.names.push(Rc::from(name));
        true
    }

    #[must_use]
    pub fn is_tracked(&self, name: &str) -> bool {
        self.names.iter().any(|n| &**n == name)
    }

    /// Lazily polled names in polling order.
    #[must_use]
    pub fn tracked_names(&self) -> &[MemberName] {
        &self.names
    }

    #[must_use]
    pub const fn render_tracked(&self) -> bool {
        self.render_tracked
    }

    /// Reject names that cannot be polled.
    ///
    /// # Errors
    ///
    /// [`TrackError::PrivateMember`] when `name` starts with
    /// [`PRIVATE_SIGIL`].
    pub fn check_name(name: &str) -> Result<()> {
        if name.starts_with(PRIVATE_SIGIL) {
            return Err(TrackError::private_member(name));
        }
        Ok(())
    }

    /// Compare `value` with the last value seen for `name` and update the
    /// cache on change.
    ///
    /// # Errors
    ///
    /// [`TrackError::PrivateMember`] when `name` is private. The cache is
    /// left untouched.
    pub fn observe(&mut self, name: &MemberName, value: Value) -> Result<Observation> {
        Self::check_name(name)?;
        Ok(record(&mut self.last_values, name, value))
    }

    /// Observe every tracked name in order, reading values through `read`.
    ///
    /// Polling stops at the first private name, which is never read. Changes
    /// recorded before it stay recorded and are counted in the report.
    pub fn poll(&mut self, mut read: impl FnMut(&str) -> Value) -> PollReport {
        let mut report = PollReport::default();
        for index in 0..self.names.len() {
            let name = Rc::clone(&self.names[index]);
            let observed =
                Self::check_name(&name).and_then(|()| self.observe(&name, read(&*name)));
            match observed {
                Ok(Observation::Changed) => report.changed += 1,
                Ok(_) => {}
                Err(error) => {
                    report.error = Some(error);
                    break;
                }
            }
        }
        report
    }

    /// The cached value for `name`.
    #[must_use]
    pub fn last_value(&self, name: &str) -> Option<&Value> {
        self.last_values.get(name)
    }

    /// Forget every cached value. Tracked names are kept.
    pub fn clear(&mut self) {
        self.last_values.clear();
    }
}

fn record(cache: &mut AHashMap<MemberName, Value>, name: &MemberName, value: Value) -> Observation {
    if let Some(last) = cache.get_mut(name) {
        if *last == value {
            return Observation::Unchanged;
        }
        *last = value;
        return Observation::Changed;
    }
    cache.insert(Rc::clone(name), value);
    Observation::Baseline
}
