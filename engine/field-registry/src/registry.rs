use crate::fields::{
    PLAYER_MATCH_FIELDS, PLAYER_SEASON_FIELDS, TEAM_MATCH_FIELDS, TEAM_SEASON_FIELDS,
};
use crate::types::{EntityKind, FieldLookupError, StatField};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Whitelisted fields of a single entity kind
#[derive(Debug)]
struct KindFields {
    /// Fields in table order, used when a request asks for "all"
    ordered: Vec<StatField>,

    /// Lookup from name to field
    by_name: HashMap<&'static str, StatField>,
}

impl KindFields {
    fn from_columns(kind: EntityKind, columns: &'static [&'static str]) -> Self {
        let ordered: Vec<StatField> =
            columns.iter().map(|column| StatField::new(kind, *column)).collect();
        let by_name = ordered.iter().map(|field| (field.column(), *field)).collect();
        Self { ordered, by_name }
    }
}

/// Field Registry - immutable whitelist of stat fields per entity kind
///
/// Built once at startup and shared behind an `Arc`. Resolution never echoes
/// a caller's string back: a resolved [`StatField`] always points at the
/// registry's own column name.
#[derive(Debug)]
pub struct FieldRegistry {
    kinds: HashMap<EntityKind, KindFields>,
}

impl FieldRegistry {
    /// Build the registry from the static column tables
    pub fn new() -> Self {
        let kinds = EntityKind::ALL
            .iter()
            .map(|kind| {
                let columns = match kind {
                    EntityKind::PlayerMatch => PLAYER_MATCH_FIELDS,
                    EntityKind::PlayerSeason => PLAYER_SEASON_FIELDS,
                    EntityKind::TeamMatch => TEAM_MATCH_FIELDS,
                    EntityKind::TeamSeason => TEAM_SEASON_FIELDS,
                };
                (*kind, KindFields::from_columns(*kind, columns))
            })
            .collect();

        Self { kinds }
    }

    fn table(&self, kind: EntityKind) -> &KindFields {
        // Every kind is inserted by `new`; a gap here is a programming error.
        match self.kinds.get(&kind) {
            Some(table) => table,
            None => panic!("field registry has no table for {kind}"),
        }
    }

    /// Whether `name` is a registered field of `kind`
    pub fn is_valid(&self, kind: EntityKind, name: &str) -> bool {
        self.table(kind).by_name.contains_key(name)
    }

    /// All fields of `kind`, in table order
    pub fn all_fields(&self, kind: EntityKind) -> &[StatField] {
        &self.table(kind).ordered
    }

    /// Number of fields registered for `kind`
    pub fn field_count(&self, kind: EntityKind) -> usize {
        self.table(kind).ordered.len()
    }

    /// Resolve a single field name
    pub fn resolve(&self, kind: EntityKind, name: &str) -> Result<StatField, FieldLookupError> {
        self.table(kind)
            .by_name
            .get(name.trim())
            .copied()
            .ok_or_else(|| FieldLookupError::UnknownField { kind, field: name.to_string() })
    }

    /// Resolve a requested field list.
    ///
    /// Blank entries are skipped and repeats collapse to their first position.
    /// If nothing is left the request means "every field of `kind`". The
    /// first unknown name fails the whole request.
    pub fn resolve_request<S: AsRef<str>>(
        &self,
        kind: EntityKind,
        requested: &[S],
    ) -> Result<Vec<StatField>, FieldLookupError> {
        let mut seen = HashSet::new();
        let mut resolved = Vec::with_capacity(requested.len());

        for name in requested.iter().map(|s| s.as_ref().trim()).filter(|s| !s.is_empty()) {
            let field = self.resolve(kind, name)?;
            if seen.insert(field.column()) {
                resolved.push(field);
            }
        }

        if resolved.is_empty() {
            debug!("No stat fields requested for {}, using all {}", kind, self.field_count(kind));
            return Ok(self.all_fields(kind).to_vec());
        }

        Ok(resolved)
    }
}

impl Default for FieldRegistry {
    fn default() -> Self {
        Self::new()
    }
}
