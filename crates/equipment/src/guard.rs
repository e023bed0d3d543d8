//! Category policy: the single place that knows serialized from fungible.
//!
//! Every category-dependent rule (shape normalization on the catalog path,
//! allocation and return legality on the ledger path) goes through
//! [`ConsistencyGuard`]. No other call site may branch on the category.

use serde::{Deserialize, Serialize};

use sentinela_core::{DomainError, DomainResult};

use crate::equipment::Equipment;

/// Controlled equipment category.
///
/// Firearms and ballistic vests are *serialized*: individually identified,
/// always quantity 1, destined to at most one post at a time. Ammunition is
/// *fungible*: tracked by count only, supports partial allocation and return.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentCategory {
    Firearm,
    BallisticVest,
    Ammunition,
}

impl EquipmentCategory {
    pub fn is_serialized(self) -> bool {
        matches!(self, Self::Firearm | Self::BallisticVest)
    }

    pub fn is_fungible(self) -> bool {
        !self.is_serialized()
    }
}

impl core::fmt::Display for EquipmentCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let label = match self {
            Self::Firearm => "firearm",
            Self::BallisticVest => "ballistic vest",
            Self::Ammunition => "ammunition",
        };
        f.write_str(label)
    }
}

/// Normalized category-dependent shape of an equipment record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    pub serial_number: Option<String>,
    pub total_quantity: u32,
}

/// Outcome of a legal `devolver` as decided by the guard.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ReturnEffect {
    /// Remove the allocation row entirely.
    Full,
    /// Keep the row with the reduced quantity (fungible only).
    Partial { remaining: u32 },
}

/// Category-keyed policy object consulted by both the catalog and the ledger.
#[derive(Debug, Copy, Clone, Default)]
pub struct ConsistencyGuard;

impl ConsistencyGuard {
    /// Normalize serial number and total quantity for a category.
    ///
    /// Serialized categories require a non-blank serial number and are pinned
    /// to exactly one unit regardless of the requested quantity. Ammunition
    /// carries no serial number and any positive total.
    pub fn normalize_shape(
        category: EquipmentCategory,
        serial_number: Option<String>,
        total_quantity: u32,
    ) -> DomainResult<Shape> {
        if category.is_serialized() {
            let serial = serial_number
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .ok_or_else(|| {
                    DomainError::validation(format!("serial number is required for {category}"))
                })?;
            return Ok(Shape {
                serial_number: Some(serial),
                total_quantity: 1,
            });
        }

        if total_quantity == 0 {
            return Err(DomainError::validation(
                "total quantity must be at least 1",
            ));
        }
        Ok(Shape {
            serial_number: None,
            total_quantity,
        })
    }

    /// Check whether `quantity` units of `equipment` may be destined now.
    pub fn check_destinar(equipment: &Equipment, quantity: u32) -> DomainResult<()> {
        if quantity == 0 {
            return Err(DomainError::validation("quantity must be at least 1"));
        }
        if !equipment.is_active() {
            return Err(DomainError::inactive_equipment(format!(
                "equipment {}",
                equipment.id_typed()
            )));
        }

        if equipment.category().is_serialized() {
            if !equipment.allocations().is_empty() {
                return Err(DomainError::already_allocated(format!(
                    "{} {} is already destined",
                    equipment.category(),
                    equipment.id_typed()
                )));
            }
            if quantity != 1 {
                return Err(DomainError::validation(
                    "serialized equipment is destined exactly one unit at a time",
                ));
            }
        }

        let available = equipment.available();
        if quantity > available {
            return Err(DomainError::insufficient_stock(quantity, available));
        }
        Ok(())
    }

    /// Decide the effect of returning `requested` units of an allocation that
    /// currently holds `allocated` units.
    ///
    /// For serialized categories the return is always full; any supplied
    /// quantity is ignored. For ammunition an omitted quantity (or exactly the
    /// remaining amount) is a full return; `0 < requested < allocated` keeps
    /// the row with the remainder; zero and over-returns are rejected.
    pub fn return_effect(
        category: EquipmentCategory,
        allocated: u32,
        requested: Option<u32>,
    ) -> DomainResult<ReturnEffect> {
        if category.is_serialized() {
            return Ok(ReturnEffect::Full);
        }

        match requested {
            None => Ok(ReturnEffect::Full),
            Some(0) => Err(DomainError::validation(
                "return quantity must be at least 1",
            )),
            Some(q) if q < allocated => Ok(ReturnEffect::Partial {
                remaining: allocated - q,
            }),
            Some(q) if q == allocated => Ok(ReturnEffect::Full),
            Some(q) => Err(DomainError::validation(format!(
                "return quantity {q} exceeds the allocated amount {allocated}"
            ))),
        }
    }
}
