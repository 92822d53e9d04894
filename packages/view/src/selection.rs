//! Resolution of map clicks to a block's transaction history.
//!
//! Widgets that can attach structured data to a point report the block
//! address directly. Widgets that can only echo a point's hover text report
//! the label instead, and the identity is recovered from the label prefix
//! written by [`crate::projection::hover_label`].

use hdb_map_housing_models::{Block, RoomCount, TimeWindow, Transaction};
use hdb_map_view_models::{SelectionView, TransactionRow};

use crate::AppContext;
use crate::projection::LABEL_SEPARATOR;

/// Message rendered in place of the table when a click is unresolved.
pub const FALLBACK_MESSAGE: &str =
    "Could not identify the selected block. Click on a point on the map.";

/// What the map widget reported for a clicked point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickPayload {
    /// The block address, carried as structured point data.
    Address(String),
    /// The full hover label of the clicked point.
    Label(String),
}

/// Reasons a click cannot be mapped to a known block.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    /// The label does not contain the identity separator.
    #[error("Click label has no '<br>' separator: {label}")]
    MissingSeparator {
        /// The raw label.
        label: String,
    },

    /// The identity before the separator is empty.
    #[error("Click label has an empty block identity: {label}")]
    EmptyIdentity {
        /// The raw label.
        label: String,
    },

    /// No block has this address.
    #[error("Unknown block: {address}")]
    UnknownBlock {
        /// The extracted address.
        address: String,
    },
}

/// A resolved click: the block and its matching transactions.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection<'a> {
    /// The clicked block.
    pub block: &'a Block,
    /// Transactions matching the selectors, in dataset order.
    pub transactions: Vec<&'a Transaction>,
}

/// Extracts the block identity from a hover label: everything before the
/// first separator.
///
/// # Errors
///
/// Returns [`SelectionError::MissingSeparator`] if the label has no
/// separator and [`SelectionError::EmptyIdentity`] if nothing precedes it.
pub fn extract_identity(label: &str) -> Result<&str, SelectionError> {
    let (identity, _) = label.split_once(LABEL_SEPARATOR).ok_or_else(|| {
        SelectionError::MissingSeparator {
            label: label.to_owned(),
        }
    })?;

    if identity.trim().is_empty() {
        return Err(SelectionError::EmptyIdentity {
            label: label.to_owned(),
        });
    }

    Ok(identity)
}

/// Resolves a click to its block and the block's transactions for the
/// selected room count and time window.
///
/// An empty transaction list is a valid result.
///
/// # Errors
///
/// Returns [`SelectionError`] if the payload does not identify a known
/// block.
pub fn resolve_click<'a>(
    ctx: &'a AppContext,
    payload: &ClickPayload,
    rooms: RoomCount,
    window: TimeWindow,
) -> Result<Selection<'a>, SelectionError> {
    let address = match payload {
        ClickPayload::Address(address) => address.as_str(),
        ClickPayload::Label(label) => extract_identity(label)?,
    };

    let dataset = ctx.dataset();
    let block = dataset
        .aggregate()
        .block(address)
        .ok_or_else(|| SelectionError::UnknownBlock {
            address: address.to_owned(),
        })?;

    let flat_type = rooms.flat_type();
    let transactions: Vec<&Transaction> = dataset
        .transactions()
        .for_address(&block.address)
        .filter(|t| t.flat_type == flat_type && t.windows.contains(window))
        .collect();

    log::debug!(
        "Resolved click to '{}': {} {} transactions in the last {} months",
        block.address,
        transactions.len(),
        flat_type,
        window.months()
    );

    Ok(Selection {
        block,
        transactions,
    })
}

/// Returns the heading shown above a block's transaction table.
#[must_use]
pub fn selection_title(address: &str, rooms: RoomCount, window: TimeWindow) -> String {
    format!(
        "{address}: {}-Room Transactions in Last {} Months",
        rooms.rooms(),
        window.months()
    )
}

/// Resolves a click into a renderable view, substituting a fallback
/// message when the click cannot be resolved.
#[must_use]
pub fn selection_view(
    ctx: &AppContext,
    payload: &ClickPayload,
    rooms: RoomCount,
    window: TimeWindow,
) -> SelectionView {
    match resolve_click(ctx, payload, rooms, window) {
        Ok(selection) => SelectionView::Table {
            title: selection_title(&selection.block.address, rooms, window),
            address: selection.block.address.clone(),
            rows: selection
                .transactions
                .into_iter()
                .map(TransactionRow::from)
                .collect(),
        },
        Err(e) => {
            log::warn!("Unresolved selection: {e}");
            SelectionView::Fallback {
                message: FALLBACK_MESSAGE.to_string(),
            }
        }
    }
}
