//! Policy documents and rule set resolution

pub mod policy;
pub mod resolver;

pub use policy::{
    GlobalPatch, GlobalSettings, OVERRIDE_FILE_NAME, Override, POLICY_FILE_NAME, RuleSet,
    policy_file, validate_rules_config,
};
pub use resolver::{Resolution, apply_override, resolve_base, resolve_for_file};
