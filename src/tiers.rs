//! Tier engine.
//!
//! A tier list is an ordered list of `{key, config, items}` records. The
//! list order *is* the display order, and a tier's config and items live in
//! the same record as its key, so "every key has a config and a sequence"
//! cannot be violated by a half-applied update.
//!
//! ## Rules
//!
//! - At least [`MIN_TIERS`] tiers exist at all times; removing below that is
//!   rejected with [`TierError::MinimumTiers`] and changes nothing.
//! - New tiers are named with the next letter after the last tier's name
//!   (`D` → `E`) and colored round-robin from the palette.
//! - Moves validate every key and the item's presence *before* touching any
//!   sequence, so a failed move leaves the list as it was.

use crate::color::{ColorError, parse_hex};
use crate::types::{ImageId, ImageItem, TierConfig, TierKey};
use std::collections::HashSet;
use thiserror::Error;

/// Fewest tiers a tier list may hold.
pub const MIN_TIERS: usize = 2;

/// Tier palette used when the config does not override it: red, orange,
/// yellow, green, blue, violet, pink.
pub const DEFAULT_PALETTE: &[&str] = &[
    "#ef4444", "#f97316", "#eab308", "#22c55e", "#3b82f6", "#8b5cf6", "#ec4899",
];

/// Names of the tiers a fresh board starts with.
pub const DEFAULT_TIER_NAMES: &[&str] = &["S", "A", "B", "C", "D"];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TierError {
    #[error("unknown tier '{0}'")]
    UnknownTier(TierKey),
    #[error("a tier list needs at least {min} tiers")]
    MinimumTiers { min: usize },
    #[error("image {item} is not in tier '{tier}'")]
    ItemNotInTier { item: ImageId, tier: TierKey },
    #[error("duplicate tier key '{0}'")]
    DuplicateKey(TierKey),
    #[error("tier name must not be empty")]
    EmptyName,
    #[error(transparent)]
    Color(#[from] ColorError),
}

/// One tier: its key, how it is displayed, and the images placed in it.
#[derive(Debug, PartialEq, Eq)]
pub struct Tier {
    pub key: TierKey,
    pub config: TierConfig,
    pub items: Vec<ImageItem>,
}

impl Tier {
    pub fn new(key: TierKey, config: TierConfig) -> Self {
        Self {
            key,
            config,
            items: Vec::new(),
        }
    }
}

/// Ordered collection of tiers.
#[derive(Debug, PartialEq, Eq)]
pub struct TierList {
    tiers: Vec<Tier>,
    palette: Vec<String>,
}

impl TierList {
    /// The `S A B C D` tier set, colored from `palette`.
    pub fn with_defaults(palette: &[String]) -> Self {
        let palette = effective_palette(palette);
        let tiers = DEFAULT_TIER_NAMES
            .iter()
            .enumerate()
            .map(|(i, name)| {
                Tier::new(
                    TierKey::from(*name),
                    TierConfig::new(*name, palette[i % palette.len()].clone()),
                )
            })
            .collect();
        Self { tiers, palette }
    }

    /// Build from existing tiers. Rejects fewer than [`MIN_TIERS`] tiers and
    /// duplicate keys.
    pub fn from_tiers(tiers: Vec<Tier>, palette: &[String]) -> Result<Self, TierError> {
        if tiers.len() < MIN_TIERS {
            return Err(TierError::MinimumTiers { min: MIN_TIERS });
        }
        let mut seen = HashSet::new();
        for tier in &tiers {
            if !seen.insert(&tier.key) {
                return Err(TierError::DuplicateKey(tier.key.clone()));
            }
        }
        Ok(Self {
            tiers,
            palette: effective_palette(palette),
        })
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    pub fn palette(&self) -> &[String] {
        &self.palette
    }

    /// Color a tier created at position `index` would get.
    pub fn palette_color(&self, index: usize) -> &str {
        &self.palette[index % self.palette.len()]
    }

    pub fn get(&self, key: &TierKey) -> Option<&Tier> {
        self.tiers.iter().find(|t| &t.key == key)
    }

    fn index_of(&self, key: &TierKey) -> Result<usize, TierError> {
        self.tiers
            .iter()
            .position(|t| &t.key == key)
            .ok_or_else(|| TierError::UnknownTier(key.clone()))
    }

    /// Key of the first tier in display order.
    pub fn first_key(&self) -> Option<&TierKey> {
        self.tiers.first().map(|t| &t.key)
    }

    /// Resolve a user reference to a tier: exact key first, then a
    /// case-insensitive display name.
    pub fn lookup(&self, reference: &str) -> Result<&TierKey, TierError> {
        if let Some(tier) = self.tiers.iter().find(|t| t.key.as_str() == reference) {
            return Ok(&tier.key);
        }
        self.tiers
            .iter()
            .find(|t| t.config.name.eq_ignore_ascii_case(reference))
            .map(|t| &t.key)
            .ok_or_else(|| TierError::UnknownTier(TierKey::from(reference)))
    }

    /// Key of the tier holding `id`, if any.
    pub fn tier_of(&self, id: &ImageId) -> Option<&TierKey> {
        self.tiers
            .iter()
            .find(|t| t.items.iter().any(|i| &i.id == id))
            .map(|t| &t.key)
    }

    /// Remove `id` from whichever tier holds it.
    pub fn take(&mut self, id: &ImageId) -> Option<(TierKey, ImageItem)> {
        self.tiers.iter_mut().find_map(|tier| {
            let pos = tier.items.iter().position(|i| &i.id == id)?;
            Some((tier.key.clone(), tier.items.remove(pos)))
        })
    }

    /// Append `item` to the tier `key`. On an unknown key the item is handed
    /// back untouched.
    pub fn append(&mut self, key: &TierKey, item: ImageItem) -> Result<(), (TierError, ImageItem)> {
        match self.index_of(key) {
            Ok(idx) => {
                self.tiers[idx].items.push(item);
                Ok(())
            }
            Err(e) => Err((e, item)),
        }
    }

    /// Move `id` from `source` to the end of `target`.
    ///
    /// Returns `Ok(false)` without change when `source == target`.
    pub fn move_between(
        &mut self,
        id: &ImageId,
        source: &TierKey,
        target: &TierKey,
    ) -> Result<bool, TierError> {
        let src = self.index_of(source)?;
        let dst = self.index_of(target)?;
        if src == dst {
            return Ok(false);
        }
        let pos = self.tiers[src]
            .items
            .iter()
            .position(|i| &i.id == id)
            .ok_or_else(|| TierError::ItemNotInTier {
                item: id.clone(),
                tier: source.clone(),
            })?;
        let item = self.tiers[src].items.remove(pos);
        self.tiers[dst].items.push(item);
        Ok(true)
    }

    /// Append a new tier after the last one and return its key.
    pub fn add(&mut self) -> TierKey {
        let name = next_tier_name(&self.tiers);
        let key = self.unique_key(&name);
        let color = self.palette_color(self.tiers.len()).to_string();
        self.tiers.push(Tier::new(key.clone(), TierConfig::new(name, color)));
        key
    }

    /// Remove tier `key`, handing back the images it held.
    pub fn remove(&mut self, key: &TierKey) -> Result<Vec<ImageItem>, TierError> {
        let idx = self.index_of(key)?;
        if self.tiers.len() <= MIN_TIERS {
            return Err(TierError::MinimumTiers { min: MIN_TIERS });
        }
        Ok(self.tiers.remove(idx).items)
    }

    /// Replace the display settings of tier `key`.
    pub fn set_config(&mut self, key: &TierKey, config: TierConfig) -> Result<(), TierError> {
        let idx = self.index_of(key)?;
        if config.name.trim().is_empty() {
            return Err(TierError::EmptyName);
        }
        parse_hex(&config.color)?;
        self.tiers[idx].config = config;
        Ok(())
    }

    pub fn rename(&mut self, key: &TierKey, name: &str) -> Result<(), TierError> {
        let idx = self.index_of(key)?;
        let config = TierConfig::new(name.trim(), self.tiers[idx].config.color.clone());
        self.set_config(key, config)
    }

    pub fn recolor(&mut self, key: &TierKey, color: &str) -> Result<(), TierError> {
        let idx = self.index_of(key)?;
        let config = TierConfig::new(self.tiers[idx].config.name.clone(), color.trim());
        self.set_config(key, config)
    }

    /// Take every image out of every tier, in display order.
    pub fn drain_items(&mut self) -> Vec<ImageItem> {
        self.tiers
            .iter_mut()
            .flat_map(|t| std::mem::take(&mut t.items))
            .collect()
    }

    /// Iterate every image in every tier, in display order.
    pub fn items(&self) -> impl Iterator<Item = &ImageItem> {
        self.tiers.iter().flat_map(|t| t.items.iter())
    }

    fn unique_key(&self, name: &str) -> TierKey {
        let base: String = name
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-");
        let base = if base.is_empty() { "tier".to_string() } else { base };
        let taken = |k: &str| self.tiers.iter().any(|t| t.key.as_str() == k);
        if !taken(&base) {
            return TierKey::new(base);
        }
        let mut n = 2;
        loop {
            let candidate = format!("{base}-{n}");
            if !taken(&candidate) {
                return TierKey::new(candidate);
            }
            n += 1;
        }
    }
}

fn effective_palette(palette: &[String]) -> Vec<String> {
    if palette.is_empty() {
        DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect()
    } else {
        palette.to_vec()
    }
}

/// Name for a tier appended after `tiers`.
///
/// The letter after the last tier's single-letter name if that is free,
/// otherwise the first unused letter `A`–`Z`, otherwise `Tier N`.
pub fn next_tier_name(tiers: &[Tier]) -> String {
    let used: HashSet<&str> = tiers.iter().map(|t| t.config.name.as_str()).collect();
    let last_letter = tiers.last().and_then(|t| {
        let mut chars = t.config.name.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_uppercase() && c < 'Z' => Some(c),
            _ => None,
        }
    });
    if let Some(c) = last_letter {
        let next = ((c as u8) + 1) as char;
        let next = next.to_string();
        if !used.contains(next.as_str()) {
            return next;
        }
    }
    ('A'..='Z')
        .map(|c| c.to_string())
        .find(|c| !used.contains(c.as_str()))
        .unwrap_or_else(|| format!("Tier {}", tiers.len() + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{item, tier_keys};

    fn defaults() -> TierList {
        TierList::with_defaults(&[])
    }

    #[test]
    fn defaults_are_s_through_d() {
        let list = defaults();
        assert_eq!(tier_keys(&list), vec!["S", "A", "B", "C", "D"]);
        assert_eq!(list.tiers()[0].config.color, "#ef4444");
        assert_eq!(list.tiers()[4].config.color, "#3b82f6");
    }

    #[test]
    fn add_names_next_letter_and_cycles_palette() {
        let mut list = defaults();
        let key = list.add();
        assert_eq!(key.as_str(), "E");
        let tier = list.get(&key).unwrap();
        assert_eq!(tier.config.name, "E");
        assert_eq!(tier.config.color, "#8b5cf6");
        assert!(tier.items.is_empty());

        let key = list.add();
        assert_eq!(key.as_str(), "F");
        assert_eq!(list.get(&key).unwrap().config.color, "#ec4899");
        let key = list.add();
        assert_eq!(list.get(&key).unwrap().config.color, "#ef4444");
    }

    #[test]
    fn add_after_renamed_last_tier_uses_first_free_letter() {
        let mut list = defaults();
        list.rename(&TierKey::from("D"), "Meh").unwrap();
        let key = list.add();
        assert_eq!(list.get(&key).unwrap().config.name, "D");
        // Key "D" is taken by the renamed tier.
        assert_eq!(key.as_str(), "D-2");
    }

    #[test]
    fn next_name_falls_back_to_numbered() {
        let palette = vec!["#000".to_string()];
        let tiers: Vec<Tier> = ('A'..='Z')
            .map(|c| Tier::new(TierKey::new(c.to_string()), TierConfig::new(c.to_string(), "#000")))
            .collect();
        let list = TierList::from_tiers(tiers, &palette).unwrap();
        assert_eq!(next_tier_name(list.tiers()), "Tier 27");
    }

    #[test]
    fn remove_sends_items_back() {
        let mut list = defaults();
        let b = TierKey::from("B");
        list.append(&b, item("x")).unwrap();
        list.append(&b, item("y")).unwrap();

        let items = list.remove(&b).unwrap();
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["x", "y"]);
        assert_eq!(tier_keys(&list), vec!["S", "A", "C", "D"]);
        assert!(list.get(&b).is_none());
    }

    #[test]
    fn remove_at_minimum_is_rejected_without_change() {
        let mut list = defaults();
        for key in ["S", "A", "B"] {
            list.remove(&TierKey::from(key)).unwrap();
        }
        list.append(&TierKey::from("C"), item("x")).unwrap();

        let err = list.remove(&TierKey::from("C")).unwrap_err();
        assert_eq!(err, TierError::MinimumTiers { min: 2 });
        assert_eq!(tier_keys(&list), vec!["C", "D"]);
        assert_eq!(list.get(&TierKey::from("C")).unwrap().items.len(), 1);
    }

    #[test]
    fn remove_unknown_tier_is_an_error() {
        let mut list = defaults();
        assert!(matches!(
            list.remove(&TierKey::from("Z")),
            Err(TierError::UnknownTier(_))
        ));
        assert_eq!(list.len(), 5);
    }

    #[test]
    fn move_between_appends_to_target() {
        let mut list = defaults();
        let (s, a) = (TierKey::from("S"), TierKey::from("A"));
        list.append(&s, item("x")).unwrap();
        list.append(&a, item("y")).unwrap();

        assert!(list.move_between(&"x".into(), &s, &a).unwrap());
        assert!(list.get(&s).unwrap().items.is_empty());
        let ids: Vec<&str> = list.get(&a).unwrap().items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["y", "x"]);
    }

    #[test]
    fn move_within_same_tier_is_noop() {
        let mut list = defaults();
        let s = TierKey::from("S");
        list.append(&s, item("x")).unwrap();
        list.append(&s, item("y")).unwrap();
        assert!(!list.move_between(&"x".into(), &s, &s).unwrap());
        let ids: Vec<&str> = list.get(&s).unwrap().items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["x", "y"]);
    }

    #[test]
    fn move_of_absent_item_changes_nothing() {
        let mut list = defaults();
        let (s, a) = (TierKey::from("S"), TierKey::from("A"));
        let err = list.move_between(&"ghost".into(), &s, &a).unwrap_err();
        assert!(matches!(err, TierError::ItemNotInTier { .. }));
        assert!(list.get(&a).unwrap().items.is_empty());
    }

    #[test]
    fn append_to_unknown_tier_returns_item() {
        let mut list = defaults();
        let (err, back) = list.append(&TierKey::from("Q"), item("x")).unwrap_err();
        assert!(matches!(err, TierError::UnknownTier(_)));
        assert_eq!(back.id.as_str(), "x");
    }

    #[test]
    fn take_finds_item_in_any_tier() {
        let mut list = defaults();
        list.append(&TierKey::from("C"), item("x")).unwrap();
        assert_eq!(list.tier_of(&"x".into()).unwrap().as_str(), "C");
        let (key, taken) = list.take(&"x".into()).unwrap();
        assert_eq!(key.as_str(), "C");
        assert_eq!(taken.id.as_str(), "x");
        assert!(list.take(&"x".into()).is_none());
    }

    #[test]
    fn rename_and_recolor_validate() {
        let mut list = defaults();
        let s = TierKey::from("S");
        list.rename(&s, "  Godlike ").unwrap();
        list.recolor(&s, "#123").unwrap();
        assert_eq!(list.get(&s).unwrap().config, TierConfig::new("Godlike", "#123"));

        assert_eq!(list.rename(&s, "   "), Err(TierError::EmptyName));
        assert!(matches!(list.recolor(&s, "blue"), Err(TierError::Color(_))));
        assert_eq!(list.get(&s).unwrap().config, TierConfig::new("Godlike", "#123"));
    }

    #[test]
    fn lookup_by_key_or_name() {
        let mut list = defaults();
        list.rename(&TierKey::from("A"), "Great").unwrap();
        assert_eq!(list.lookup("A").unwrap().as_str(), "A");
        assert_eq!(list.lookup("great").unwrap().as_str(), "A");
        assert!(list.lookup("nope").is_err());
    }

    #[test]
    fn from_tiers_rejects_duplicates_and_too_few() {
        let one = vec![Tier::new("S".into(), TierConfig::new("S", "#fff"))];
        assert!(matches!(
            TierList::from_tiers(one, &[]),
            Err(TierError::MinimumTiers { .. })
        ));
        let dup = vec![
            Tier::new("S".into(), TierConfig::new("S", "#fff")),
            Tier::new("S".into(), TierConfig::new("S2", "#fff")),
        ];
        assert!(matches!(
            TierList::from_tiers(dup, &[]),
            Err(TierError::DuplicateKey(_))
        ));
    }
}
