// Ordering engine: dense zero-based display sequences.
//
// One generic engine serves every orderable collection (categories, menu
// entries, a listing's photo set). Plans are computed purely from a fetched
// snapshot, then persisted as a batch through the collection adapter; on a
// failed persist the engine re-fetches the canonical server order and
// surfaces a partial-failure error so callers never trust their optimistic
// local sequence. Across independent sessions the policy is last-writer-wins;
// concurrent reorder intents are never merged.

pub mod collections;

use async_trait::async_trait;

use crate::common::{CoreError, CoreResult};

/// An item carrying a display sequence slot.
pub trait Orderable {
    fn sequence_id(&self) -> i64;
    fn sequence_order(&self) -> i32;
}

/// A `(id, display_order)` write the engine wants persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderAssignment {
    pub id: i64,
    pub display_order: i32,
}

/// A named, persistable ordered collection.
#[async_trait]
pub trait OrderedCollection: Send + Sync {
    type Item: Orderable + Send + Sync;

    /// Collection name used in partial-failure reports and logs.
    fn label(&self) -> &'static str;

    /// Current items, sorted by display order.
    async fn fetch(&self) -> CoreResult<Vec<Self::Item>>;

    /// Persist the given slot assignments as a batch.
    async fn persist(&self, plan: &[OrderAssignment]) -> CoreResult<()>;
}

// =============================================================================
// Pure planning
// =============================================================================

/// Validate that `proposed` is a permutation of `current`.
pub fn validate_permutation(current: &[i64], proposed: &[i64]) -> CoreResult<()> {
    let mut a = current.to_vec();
    let mut b = proposed.to_vec();
    a.sort_unstable();
    b.sort_unstable();
    if a != b {
        return Err(CoreError::conflict(
            "sequence mismatch: submitted order is not a permutation of the current collection",
        ));
    }
    Ok(())
}

/// Dense reindex of `items` in their current relative order, emitting only
/// the assignments that actually change a slot.
pub fn compaction_plan<T: Orderable>(items: &[T]) -> Vec<OrderAssignment> {
    let mut sorted: Vec<&T> = items.iter().collect();
    sorted.sort_by_key(|item| item.sequence_order());
    sorted
        .iter()
        .enumerate()
        .filter(|(index, item)| item.sequence_order() != *index as i32)
        .map(|(index, item)| OrderAssignment {
            id: item.sequence_id(),
            display_order: index as i32,
        })
        .collect()
}

fn sequence_plan(ids: &[i64]) -> Vec<OrderAssignment> {
    ids.iter()
        .enumerate()
        .map(|(index, id)| OrderAssignment {
            id: *id,
            display_order: index as i32,
        })
        .collect()
}

// =============================================================================
// Operations
// =============================================================================

/// Replace the collection's sequence with `ids`.
///
/// Reordering an empty or singleton collection is a successful no-op. On a
/// partial persist failure the canonical order is re-fetched and the error
/// surfaced as [`CoreError::Partial`].
pub async fn reorder<C: OrderedCollection>(collection: &C, ids: &[i64]) -> CoreResult<()> {
    let current = collection.fetch().await?;
    let current_ids: Vec<i64> = current.iter().map(Orderable::sequence_id).collect();
    validate_permutation(&current_ids, ids)?;

    if ids.len() <= 1 {
        return Ok(());
    }

    persist_or_reconcile(collection, &sequence_plan(ids)).await
}

/// Reserve a slot for an insert. `at = None` (or past the tail) appends;
/// otherwise entries at and after `at` are shifted right first. Returns the
/// display order the new item should be created with.
pub async fn insert_slot<C: OrderedCollection>(
    collection: &C,
    at: Option<usize>,
) -> CoreResult<i32> {
    let current = collection.fetch().await?;
    let len = current.len();
    let index = at.unwrap_or(len).min(len);

    if index < len {
        let shifts: Vec<OrderAssignment> = current[index..]
            .iter()
            .map(|item| OrderAssignment {
                id: item.sequence_id(),
                display_order: item.sequence_order() + 1,
            })
            .collect();
        persist_or_reconcile(collection, &shifts).await?;
    }

    Ok(index as i32)
}

/// Re-establish a dense 0..N-1 sequence after a removal. Removing the last
/// item leaves an empty sequence without error.
pub async fn compact<C: OrderedCollection>(collection: &C) -> CoreResult<()> {
    let current = collection.fetch().await?;
    let plan = compaction_plan(&current);
    if plan.is_empty() {
        return Ok(());
    }
    persist_or_reconcile(collection, &plan).await
}

/// Move `id` to the front of the sequence, preserving the relative order of
/// everything else. For photo collections the adapter derives the primary
/// flag from slot 0.
pub async fn move_to_front<C: OrderedCollection>(collection: &C, id: i64) -> CoreResult<()> {
    let current = collection.fetch().await?;
    if !current.iter().any(|item| item.sequence_id() == id) {
        return Err(CoreError::not_found("ordered item", id));
    }

    let mut ids: Vec<i64> = current.iter().map(Orderable::sequence_id).collect();
    ids.retain(|other| *other != id);
    ids.insert(0, id);

    persist_or_reconcile(collection, &sequence_plan(&ids)).await
}

async fn persist_or_reconcile<C: OrderedCollection>(
    collection: &C,
    plan: &[OrderAssignment],
) -> CoreResult<()> {
    match collection.persist(plan).await {
        Ok(()) => Ok(()),
        Err(err) => {
            // The client-side sequence is no longer trustworthy; re-fetch the
            // canonical order before reporting, so callers can re-render from
            // server state instead of their optimistic copy.
            match collection.fetch().await {
                Ok(canonical) => {
                    let order: Vec<i64> =
                        canonical.iter().map(Orderable::sequence_id).collect();
                    tracing::warn!(
                        collection = collection.label(),
                        error = %err,
                        canonical = ?order,
                        "Order persist failed; canonical sequence re-fetched"
                    );
                }
                Err(refetch_err) => {
                    tracing::warn!(
                        collection = collection.label(),
                        error = %err,
                        refetch_error = %refetch_err,
                        "Order persist failed and canonical re-fetch also failed"
                    );
                }
            }

            Err(match err {
                partial @ CoreError::Partial { .. } => partial,
                other => {
                    tracing::warn!(collection = collection.label(), error = %other, "Reorder not fully applied");
                    CoreError::Partial {
                        operation: collection.label(),
                        applied: 0,
                        total: plan.len(),
                    }
                }
            })
        }
    }
}
