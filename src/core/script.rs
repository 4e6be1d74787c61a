//! The host engine's script callback contract.
//!
//! The host loads a script, hands it a capability object (`log`, `system`,
//! `gui`) and drives five lifecycle callbacks. Nothing in this crate calls
//! them; this module only checks that a script exposes them so the runtime
//! built from the manifests has something to drive.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Matches `def name` / `def name(args)` / `def name args`.
static DEF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*def[ \t]+([A-Za-z_][A-Za-z0-9_]*[?!]?)[ \t]*(?:\(([^)]*)\)|([^#\n;]*))")
        .expect("callback definition regex is valid")
});

/// A lifecycle callback invoked by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleCallback {
    /// Called once after the script is loaded.
    Load,
    /// Called every tick with the elapsed time.
    Update,
    /// Called with each input event (events carry a `type`).
    Input,
    /// Called once per frame.
    Draw,
    /// Called once before teardown.
    Quit,
}

impl LifecycleCallback {
    pub const ALL: [LifecycleCallback; 5] = [
        LifecycleCallback::Load,
        LifecycleCallback::Update,
        LifecycleCallback::Input,
        LifecycleCallback::Draw,
        LifecycleCallback::Quit,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LifecycleCallback::Load => "load",
            LifecycleCallback::Update => "update",
            LifecycleCallback::Input => "input",
            LifecycleCallback::Draw => "draw",
            LifecycleCallback::Quit => "quit",
        }
    }

    /// Number of arguments the host passes.
    pub fn arity(&self) -> usize {
        match self {
            LifecycleCallback::Update | LifecycleCallback::Input => 1,
            _ => 0,
        }
    }
}

impl fmt::Display for LifecycleCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name(), self.arity())
    }
}

/// A callback defined with the wrong number of parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArityMismatch {
    pub callback: LifecycleCallback,
    pub found: usize,
}

/// Result of checking a script against the callback contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScriptReport {
    pub missing: Vec<LifecycleCallback>,
    pub arity_mismatches: Vec<ArityMismatch>,
}

impl ScriptReport {
    pub fn is_ok(&self) -> bool {
        self.missing.is_empty() && self.arity_mismatches.is_empty()
    }
}

/// Check that `source` defines every lifecycle callback with the expected arity.
pub fn check_script(source: &str) -> ScriptReport {
    let defs: Vec<(&str, usize)> = DEF_RE
        .captures_iter(source)
        .map(|caps| {
            let name = caps.get(1).map_or("", |m| m.as_str());
            let params = caps
                .get(2)
                .or_else(|| caps.get(3))
                .map_or("", |m| m.as_str());
            (name, count_params(params))
        })
        .collect();

    let mut report = ScriptReport::default();
    for callback in LifecycleCallback::ALL {
        match defs.iter().find(|(name, _)| *name == callback.name()) {
            None => report.missing.push(callback),
            Some((_, found)) if *found != callback.arity() => {
                report.arity_mismatches.push(ArityMismatch {
                    callback,
                    found: *found,
                })
            }
            Some(_) => {}
        }
    }
    report
}

fn count_params(params: &str) -> usize {
    params
        .split(',')
        .filter(|p| !p.trim().is_empty())
        .count()
}
