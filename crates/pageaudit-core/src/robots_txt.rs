//! robots.txt parsing
//!
//! Only what the auditor needs: `Sitemap:` directives for sitemap discovery
//! and per-agent allow/disallow rules for the crawlability check.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Parsed robots.txt
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotsTxt {
    /// `Sitemap:` URLs in file order
    pub sitemaps: Vec<String>,

    /// Rule groups keyed by lower-cased user agent
    pub agent_rules: BTreeMap<String, AgentRules>,
}

/// Rules for one user agent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRules {
    pub disallow: Vec<String>,
    pub allow: Vec<String>,
    pub crawl_delay: Option<f64>,
}

impl AgentRules {
    /// `Disallow: /` with no allow exceptions
    pub fn blocks_all(&self) -> bool {
        self.allow.is_empty() && self.disallow.iter().any(|p| p == "/")
    }
}

impl RobotsTxt {
    /// Rules for `agent`, falling back to the `*` group
    pub fn rules_for(&self, agent: &str) -> Option<&AgentRules> {
        self.agent_rules
            .get(&agent.trim().to_ascii_lowercase())
            .or_else(|| self.agent_rules.get("*"))
    }
}

/// Parse robots.txt content; unknown directives and malformed lines are ignored
///
/// Consecutive `User-agent` lines share the rule group that follows them.
pub fn parse_robots_txt(content: &str) -> RobotsTxt {
    let mut robots = RobotsTxt::default();
    let mut group_agents: Vec<String> = Vec::new();
    let mut group_rules = AgentRules::default();
    let mut in_rules = false;

    for raw in content.lines() {
        let line = raw.split('#').next().unwrap_or_default().trim();
        let Some((directive, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();

        match directive.trim().to_ascii_lowercase().as_str() {
            "user-agent" => {
                if in_rules {
                    flush_group(&mut robots, &mut group_agents, &mut group_rules);
                    in_rules = false;
                }
                if !value.is_empty() {
                    group_agents.push(value.to_ascii_lowercase());
                }
            }
            "disallow" => {
                in_rules = true;
                if !value.is_empty() {
                    group_rules.disallow.push(value.to_string());
                }
            }
            "allow" => {
                in_rules = true;
                if !value.is_empty() {
                    group_rules.allow.push(value.to_string());
                }
            }
            "crawl-delay" => {
                in_rules = true;
                group_rules.crawl_delay = value.parse::<f64>().ok().filter(|d| *d >= 0.0);
            }
            "sitemap" => {
                if !value.is_empty() {
                    robots.sitemaps.push(value.to_string());
                }
            }
            _ => {}
        }
    }
    flush_group(&mut robots, &mut group_agents, &mut group_rules);

    robots
}

fn flush_group(robots: &mut RobotsTxt, agents: &mut Vec<String>, rules: &mut AgentRules) {
    let rules = std::mem::take(rules);
    for agent in agents.drain(..) {
        let entry = robots.agent_rules.entry(agent).or_default();
        entry.disallow.extend(rules.disallow.iter().cloned());
        entry.allow.extend(rules.allow.iter().cloned());
        if rules.crawl_delay.is_some() {
            entry.crawl_delay = rules.crawl_delay;
        }
    }
}

/// Whether `agent` may fetch `path`
///
/// The longest matching prefix wins; on a tie `Allow` wins. No rules means
/// allowed.
pub fn is_path_allowed(path: &str, agent: &str, robots: &RobotsTxt) -> bool {
    let Some(rules) = robots.rules_for(agent) else {
        return true;
    };

    let longest = |patterns: &[String]| {
        patterns
            .iter()
            .filter(|p| path.starts_with(p.as_str()))
            .map(String::len)
            .max()
    };

    match (longest(&rules.allow), longest(&rules.disallow)) {
        (_, None) => true,
        (None, Some(_)) => false,
        (Some(allow), Some(disallow)) => allow >= disallow,
    }
}
