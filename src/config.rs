// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Reporter configuration surface.

use smart_default::SmartDefault;

use crate::client::{Attribute, LaunchMode};

/// Configuration of a [`ScenarioReporter`].
///
/// [`ScenarioReporter`]: crate::ScenarioReporter
#[derive(Clone, Debug, SmartDefault)]
pub struct Config {
    /// Name of the reported launch.
    #[default("Cucumber launch")]
    pub launch_name: String,

    /// Launch description.
    pub launch_description: Option<String>,

    /// Launch reporting mode.
    pub launch_mode: LaunchMode,

    /// Preconfigured launch attributes. A system `skippedIssue` attribute is
    /// merged in when [`Config::skipped_issue`] is set.
    pub attributes: Vec<Attribute>,

    /// Whether skipped items raise an issue for triage. Reported as a system
    /// launch attribute when present.
    #[default(Some(true))]
    pub skipped_issue: Option<bool>,

    /// Whether this launch reruns a previous one.
    pub rerun: bool,

    /// Reference to the launch being rerun.
    pub rerun_of: Option<String>,

    /// Enables the item tree for callback-reporting consumers.
    pub callback_reporting: bool,

    /// Caps error text used in logs and failure descriptions.
    #[default(true)]
    pub truncate_errors: bool,
}

impl Config {
    /// Launch attributes with the system `skippedIssue` attribute merged in.
    #[must_use]
    pub fn launch_attributes(&self) -> Vec<Attribute> {
        let mut attributes = self.attributes.clone();
        if let Some(skipped_issue) = self.skipped_issue {
            attributes.push(Attribute::system(
                "skippedIssue",
                skipped_issue.to_string(),
            ));
        }
        attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.launch_name, "Cucumber launch");
        assert_eq!(config.launch_mode, LaunchMode::Default);
        assert!(config.truncate_errors);
        assert!(!config.callback_reporting);
    }

    #[test]
    fn skipped_issue_becomes_a_system_attribute() {
        let config = Config {
            attributes: vec![Attribute::value("smoke")],
            skipped_issue: Some(false),
            ..Config::default()
        };
        let attributes = config.launch_attributes();
        assert_eq!(attributes.len(), 2);
        assert_eq!(attributes[1], Attribute::system("skippedIssue", "false"));

        let none = Config { skipped_issue: None, ..Config::default() };
        assert!(none.launch_attributes().is_empty());
    }
}
