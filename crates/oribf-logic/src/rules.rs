//! The declarative rule table and its load-time resolution.
//!
//! The table is data: regions own locations and outgoing connections, and
//! each access point maps tier names to lists of access-sets. Raw atoms
//! are either a name (`"Bash"`, `"DoubleBash"`, `"Free"`) or a counted
//! pair (`["KeyStone", 4]`). [`resolve_rules`] turns every raw atom into a
//! typed [`Atom`] exactly once, so unknown names surface here rather than
//! during evaluation.
//!
//! ```
//! use oribf_logic::rules::{resolve_rules, RuleTable};
//!
//! let table = RuleTable::from_json(r#"{
//!     "root": "Menu",
//!     "start": "Glades",
//!     "regions": [
//!         { "name": "Menu" },
//!         { "name": "Glades", "area": "Glades",
//!           "locations": [ { "name": "GladesKeystone", "rules": { "casual": [["Free"]] } } ] }
//!     ]
//! }"#).unwrap();
//! let resolved = resolve_rules(&table, true).unwrap();
//! assert_eq!(resolved.locations.len(), 1);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::atoms::Atom;
use crate::capability::Capability;
use crate::error::GenerationError;
use crate::formula::{AccessFormula, AccessRule, AccessSet};
use crate::items::is_item;
use crate::tiers::Tier;

const BUILTIN_RULES: &str = include_str!("../data/rules.json");

/// An atom as written in the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAtom {
    Name(String),
    Counted(String, u32),
}

/// Tier name → access-sets, each a list of raw atoms.
pub type RawFormula = BTreeMap<Tier, Vec<Vec<RawAtom>>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRules {
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub rules: RawFormula,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRules {
    pub to: String,
    /// Missing rules mean a free connection.
    #[serde(default)]
    pub rules: Option<RawFormula>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionRules {
    pub name: String,
    /// Area tag used by relic placement.
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub locations: Vec<LocationRules>,
    #[serde(default)]
    pub connections: Vec<ConnectionRules>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTable {
    /// Entry node of the graph; must have no incoming connections.
    pub root: String,
    /// Region the root connects to.
    pub start: String,
    pub regions: Vec<RegionRules>,
}

impl RuleTable {
    pub fn from_json(json: &str) -> Result<Self, GenerationError> {
        serde_json::from_str(json).map_err(|e| GenerationError::rule_table(e.to_string()))
    }

    /// The rule table shipped with the crate.
    pub fn builtin() -> Result<Self, GenerationError> {
        Self::from_json(BUILTIN_RULES)
    }

    pub fn region(&self, name: &str) -> Option<&RegionRules> {
        self.regions.iter().find(|r| r.name == name)
    }

    pub fn location_count(&self) -> usize {
        self.regions.iter().map(|r| r.locations.len()).sum()
    }
}

/// An unknown atom tolerated in lenient mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub access_point: String,
    pub atom: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRegion {
    pub name: String,
    pub area: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConnection {
    pub from: String,
    pub to: String,
    pub entrance: String,
    pub formula: AccessFormula,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocation {
    pub region: String,
    pub name: String,
    pub tags: Vec<String>,
    pub rule: AccessRule,
}

impl ResolvedLocation {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// The rule table with every atom typed and every entrance named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRules {
    pub root: String,
    pub start: String,
    pub regions: Vec<ResolvedRegion>,
    pub connections: Vec<ResolvedConnection>,
    pub locations: Vec<ResolvedLocation>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ResolvedRules {
    pub fn area_of(&self, region: &str) -> Option<&str> {
        self.regions
            .iter()
            .find(|r| r.name == region)
            .and_then(|r| r.area.as_deref())
    }
}

/// Entrance name for the `n`-th connection (1-based) leaving `from`.
pub fn entrance_name(from: &str, to: &str, n: usize) -> String {
    format!("{}_to_{}_{}", from, to, n)
}

/// Type every atom in the table.
///
/// In strict mode an unknown atom is an error. Otherwise the access-set
/// holding it is dropped (it could never be satisfied) and a diagnostic is
/// recorded.
pub fn resolve_rules(table: &RuleTable, strict: bool) -> Result<ResolvedRules, GenerationError> {
    let mut resolver = Resolver {
        strict,
        diagnostics: Vec::new(),
    };
    let mut regions = Vec::with_capacity(table.regions.len());
    let mut connections = Vec::new();
    let mut locations = Vec::with_capacity(table.location_count());

    for region in &table.regions {
        regions.push(ResolvedRegion {
            name: region.name.clone(),
            area: region.area.clone(),
        });

        for (i, conn) in region.connections.iter().enumerate() {
            let entrance = entrance_name(&region.name, &conn.to, i + 1);
            let formula = match &conn.rules {
                Some(raw) => resolver.formula(&entrance, raw)?,
                None => AccessFormula::free(),
            };
            connections.push(ResolvedConnection {
                from: region.name.clone(),
                to: conn.to.clone(),
                entrance,
                formula,
            });
        }

        for loc in &region.locations {
            let formula = resolver.formula(&loc.name, &loc.rules)?;
            locations.push(ResolvedLocation {
                region: region.name.clone(),
                name: loc.name.clone(),
                tags: loc.tags.clone(),
                rule: formula.into(),
            });
        }
    }

    Ok(ResolvedRules {
        root: table.root.clone(),
        start: table.start.clone(),
        regions,
        connections,
        locations,
        diagnostics: resolver.diagnostics,
    })
}

struct Resolver {
    strict: bool,
    diagnostics: Vec<Diagnostic>,
}

impl Resolver {
    fn formula(&mut self, access_point: &str, raw: &RawFormula) -> Result<AccessFormula, GenerationError> {
        let mut formula = AccessFormula::new();
        for (tier, sets) in raw {
            'sets: for set in sets {
                if set.is_empty() {
                    return Err(GenerationError::rule_table(format!(
                        "empty access set in {} tier of {}",
                        tier, access_point
                    )));
                }
                let mut atoms = Vec::with_capacity(set.len());
                for raw_atom in set {
                    match resolve_atom(raw_atom) {
                        Ok(atom) => atoms.push(atom),
                        Err(AtomError::ZeroCount(name)) => {
                            return Err(GenerationError::rule_table(format!(
                                "{} requires zero copies of {}",
                                access_point, name
                            )));
                        }
                        Err(AtomError::Unknown(name)) => {
                            if self.strict {
                                return Err(GenerationError::UnknownAtom {
                                    atom: name,
                                    access_point: access_point.to_string(),
                                });
                            }
                            log::warn!(
                                "Unknown requirement {} at {}; access set dropped",
                                name,
                                access_point
                            );
                            self.diagnostics.push(Diagnostic {
                                access_point: access_point.to_string(),
                                atom: name,
                            });
                            continue 'sets;
                        }
                    }
                }
                formula.push(*tier, AccessSet(atoms));
            }
        }
        Ok(formula)
    }
}

enum AtomError {
    Unknown(String),
    ZeroCount(String),
}

fn resolve_atom(raw: &RawAtom) -> Result<Atom, AtomError> {
    match raw {
        RawAtom::Name(name) if name == "Free" => Ok(Atom::Free),
        RawAtom::Name(name) if is_item(name) => Ok(Atom::Item(name.clone())),
        RawAtom::Name(name) => Capability::from_token(name)
            .map(Atom::Capability)
            .ok_or_else(|| AtomError::Unknown(name.clone())),
        RawAtom::Counted(name, 0) => Err(AtomError::ZeroCount(name.clone())),
        RawAtom::Counted(name, n) if is_item(name) => Ok(Atom::ItemCount(name.clone(), *n)),
        RawAtom::Counted(name, n) => Err(AtomError::Unknown(format!("{}x{}", name, n))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = r#"{
        "root": "Menu",
        "start": "Runaway",
        "regions": [
            { "name": "Menu" },
            { "name": "Runaway", "area": "Glades",
              "connections": [
                  { "to": "Main" },
                  { "to": "Main", "rules": { "casual": [["WallJump"]], "expert": [["Lure", ["KeyStone", 2]]] } }
              ],
              "locations": [
                  { "name": "RunawayCell", "tags": ["pickup"], "rules": { "casual": [["Free"]] } }
              ] },
            { "name": "Main", "area": "Glades" }
        ]
    }"#;

    #[test]
    fn parses_and_names_parallel_entrances() {
        let table = RuleTable::from_json(SMALL).unwrap();
        let resolved = resolve_rules(&table, true).unwrap();
        let names: Vec<_> = resolved.connections.iter().map(|c| c.entrance.as_str()).collect();
        assert_eq!(names, vec!["Runaway_to_Main_1", "Runaway_to_Main_2"]);
        assert_eq!(resolved.connections[0].formula, AccessFormula::free());
        assert_eq!(resolved.area_of("Main"), Some("Glades"));
    }

    #[test]
    fn atoms_are_typed() {
        let resolved = resolve_rules(&RuleTable::from_json(SMALL).unwrap(), true).unwrap();
        let atoms: Vec<_> = resolved.connections[1].formula.atoms().cloned().collect();
        assert_eq!(
            atoms,
            vec![
                Atom::Item("WallJump".into()),
                Atom::Capability(Capability::Lure),
                Atom::ItemCount("KeyStone".into(), 2),
            ]
        );
    }

    #[test]
    fn unknown_atom_strict_errors() {
        let json = SMALL.replace("\"WallJump\"", "\"WallRun\"");
        let err = resolve_rules(&RuleTable::from_json(&json).unwrap(), true).unwrap_err();
        assert_eq!(
            err,
            GenerationError::UnknownAtom {
                atom: "WallRun".into(),
                access_point: "Runaway_to_Main_2".into(),
            }
        );
    }

    #[test]
    fn unknown_atom_lenient_drops_set() {
        let json = SMALL.replace("\"WallJump\"", "\"WallRun\"");
        let resolved = resolve_rules(&RuleTable::from_json(&json).unwrap(), false).unwrap();
        assert_eq!(resolved.diagnostics.len(), 1);
        let tiers: Vec<_> = resolved.connections[1].formula.tiers().map(|(t, _)| t).collect();
        assert_eq!(tiers, vec![Tier::Expert]);
    }

    #[test]
    fn zero_count_rejected() {
        let json = SMALL.replace("[\"KeyStone\", 2]", "[\"KeyStone\", 0]");
        let err = resolve_rules(&RuleTable::from_json(&json).unwrap(), true).unwrap_err();
        assert!(matches!(err, GenerationError::InvalidRuleTable(_)));
    }

    #[test]
    fn unknown_tier_is_parse_error() {
        let json = SMALL.replace("\"expert\"", "\"legendary\"");
        assert!(matches!(
            RuleTable::from_json(&json),
            Err(GenerationError::InvalidRuleTable(_))
        ));
    }

    #[test]
    fn builtin_table_resolves_strictly() {
        let table = RuleTable::builtin().unwrap();
        let resolved = resolve_rules(&table, true).unwrap();
        assert!(resolved.diagnostics.is_empty());
        assert!(resolved.locations.len() >= 200);
    }
}
