//! Loaded kernel module records.
//!
//! These structures describe one line of `/proc/modules` each. Parsing lives in
//! [`crate::collector::procfs::parser`]; this module only holds the data.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Modules keyed by name.
///
/// Built fresh for every parse. When the source lists the same name twice the
/// later line wins.
pub type ModuleTable = HashMap<String, ModuleInfo>;

/// One loaded kernel module.
///
/// Source file:
/// - `/proc/modules` - one whitespace separated line per module
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ModuleInfo {
    /// Module name (field 1).
    pub name: String,
    /// Memory occupied by the module, in bytes (field 2).
    pub mem: u64,
    /// Number of loaded instances, i.e. the reference count (field 3).
    pub instances: u64,
    /// Module names listed in field 4, in the order the kernel printed them.
    /// Empty when the field is `-`.
    pub depends: Vec<String>,
    /// Load state (field 5).
    pub state: ModuleState,
    /// Kernel memory offset (field 6). Zero when the kernel hides addresses.
    pub offset: u64,
    /// Taint flags (field 7). `None` when the line has no seventh field.
    pub taints: Option<TaintFlags>,
}

/// Module load state as printed by the kernel.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub enum ModuleState {
    Live,
    Loading,
    Unloading,
}

impl ModuleState {
    /// Maps a state token to its variant. Matching is exact.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "Live" => Some(ModuleState::Live),
            "Loading" => Some(ModuleState::Loading),
            "Unloading" => Some(ModuleState::Unloading),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleState::Live => "Live",
            ModuleState::Loading => "Loading",
            ModuleState::Unloading => "Unloading",
        }
    }
}

impl std::fmt::Display for ModuleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single module taint reason.
///
/// Declared in the order the kernel prints them, so iterating a
/// [`TaintFlags`] reproduces the kernel's string.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub enum Taint {
    /// `P`: proprietary (non-GPL compatible) license.
    Proprietary,
    /// `F`: module was force loaded.
    Forced,
    /// `C`: module comes from drivers/staging.
    Staging,
    /// `O`: externally built ("out-of-tree") module.
    OutOfTree,
    /// `E`: unsigned module loaded on a kernel that supports signing.
    Unsigned,
    /// `K`: live patch module.
    Livepatch,
    /// `X`: auxiliary taint, defined by distributions.
    Auxiliary,
    /// `T`: built with a different randstruct seed.
    Randstruct,
    /// `N`: in-kernel test module.
    Test,
}

impl Taint {
    pub const ALL: [Taint; 9] = [
        Taint::Proprietary,
        Taint::Forced,
        Taint::Staging,
        Taint::OutOfTree,
        Taint::Unsigned,
        Taint::Livepatch,
        Taint::Auxiliary,
        Taint::Randstruct,
        Taint::Test,
    ];

    pub fn from_char(c: char) -> Option<Self> {
        Taint::ALL.into_iter().find(|t| t.as_char() == c)
    }

    pub fn as_char(&self) -> char {
        match self {
            Taint::Proprietary => 'P',
            Taint::Forced => 'F',
            Taint::Staging => 'C',
            Taint::OutOfTree => 'O',
            Taint::Unsigned => 'E',
            Taint::Livepatch => 'K',
            Taint::Auxiliary => 'X',
            Taint::Randstruct => 'T',
            Taint::Test => 'N',
        }
    }

    fn bit(self) -> u16 {
        1 << self as u16
    }
}

/// Set of taint reasons attached to a module.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash, Default)]
#[serde(into = "Vec<Taint>", from = "Vec<Taint>")]
pub struct TaintFlags(u16);

impl TaintFlags {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, taint: Taint) {
        self.0 |= taint.bit();
    }

    pub fn contains(&self, taint: Taint) -> bool {
        self.0 & taint.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterates taints in kernel print order.
    pub fn iter(&self) -> impl Iterator<Item = Taint> + '_ {
        Taint::ALL.into_iter().filter(move |t| self.contains(*t))
    }
}

impl FromIterator<Taint> for TaintFlags {
    fn from_iter<I: IntoIterator<Item = Taint>>(iter: I) -> Self {
        let mut flags = TaintFlags::empty();
        for taint in iter {
            flags.insert(taint);
        }
        flags
    }
}

impl From<Vec<Taint>> for TaintFlags {
    fn from(taints: Vec<Taint>) -> Self {
        taints.into_iter().collect()
    }
}

impl From<TaintFlags> for Vec<Taint> {
    fn from(flags: TaintFlags) -> Self {
        flags.iter().collect()
    }
}

/// Renders the kernel form, e.g. `(POE)`.
impl std::fmt::Display for TaintFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("(")?;
        for taint in self.iter() {
            write!(f, "{}", taint.as_char())?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_state_tokens() {
        assert_eq!(ModuleState::from_token("Live"), Some(ModuleState::Live));
        assert_eq!(
            ModuleState::from_token("Unloading"),
            Some(ModuleState::Unloading)
        );
        assert_eq!(ModuleState::from_token("live"), None);
        assert_eq!(ModuleState::from_token("Blorgon"), None);
        assert_eq!(ModuleState::Loading.to_string(), "Loading");
    }

    #[test]
    fn test_taint_chars_are_unique() {
        for taint in Taint::ALL {
            assert_eq!(Taint::from_char(taint.as_char()), Some(taint));
        }
        assert_eq!(Taint::from_char('Z'), None);
        assert_eq!(Taint::from_char('+'), None);
    }

    #[test]
    fn test_taint_flags_display_uses_kernel_order() {
        let flags: TaintFlags = [Taint::Unsigned, Taint::OutOfTree, Taint::Proprietary]
            .into_iter()
            .collect();
        assert_eq!(flags.len(), 3);
        assert!(flags.contains(Taint::OutOfTree));
        assert!(!flags.contains(Taint::Staging));
        assert_eq!(flags.to_string(), "(POE)");
    }

    #[test]
    fn test_taint_flags_serialize_as_list() {
        let flags: TaintFlags = [Taint::OutOfTree, Taint::Unsigned].into_iter().collect();
        let json = serde_json::to_string(&flags).unwrap();
        assert_eq!(json, r#"["OutOfTree","Unsigned"]"#);
        let back: TaintFlags = serde_json::from_str(&json).unwrap();
        assert_eq!(back, flags);
    }
}
