//! Assignment engine - The workflows that tie computers to employees.
//!
//! The engine owns its collaborators: a store connection, a cache tier, and a notifier,
//! all injected at construction. Reads go through the cache (`computer:<id>` and
//! `computers_by_employee_<abbrev>`); every write runs in a single store transaction so a
//! failed step leaves no partial rows behind, and evicts the cache keys it made stale.
//! No network call is made while a transaction is open: the quota notification is sent
//! after the creating transaction commits, and a failed delivery deletes the new
//! computer again.
//!
//! Employee abbreviations are trimmed at every entry point.
//!
//! Ownership is a single canonical row per computer in `employee_computers`. Creation
//! and reassignment both write that row, and the computer's `employee_abbrev` hint is
//! kept in step with it so the quota count stays accurate.

use crate::{
    cache::{CacheTier, computer_key, employee_computers_key, evict, read_through},
    config::settings::AssignmentSettings,
    core::{
        computer::{self, NewComputer},
        employee::{self, NewEmployee},
    },
    entities,
    errors::{Error, Result},
    notification::Notifier,
};
use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::{error, info, instrument, warn};

/// What a reassignment did to the ownership link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reassignment {
    /// The computer had no owner; a link was inserted
    Inserted,
    /// The link was moved in place from another employee
    Updated { previous_employee_id: i64 },
    /// The computer already belonged to the target employee
    Unchanged,
}

/// Human-readable quota notification text.
#[must_use]
pub fn quota_message(abbreviation: &str, count: u64) -> String {
    format!("Employee {abbreviation} already has {count} computers assigned.")
}

/// Orchestrates computer creation, lookup, reassignment, and deletion.
#[derive(Debug)]
pub struct AssignmentEngine<C, N> {
    db: DatabaseConnection,
    cache: C,
    notifier: N,
    settings: AssignmentSettings,
}

impl<C, N> AssignmentEngine<C, N>
where
    C: CacheTier,
    N: Notifier,
{
    /// Creates an engine over already-initialized collaborators.
    #[must_use]
    pub const fn new(
        db: DatabaseConnection,
        cache: C,
        notifier: N,
        settings: AssignmentSettings,
    ) -> Self {
        Self {
            db,
            cache,
            notifier,
            settings,
        }
    }

    /// The store connection.
    pub const fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// The cache tier.
    pub const fn cache(&self) -> &C {
        &self.cache
    }

    /// The administrator notifier.
    pub const fn notifier(&self) -> &N {
        &self.notifier
    }

    /// The engine's tunables.
    pub const fn settings(&self) -> &AssignmentSettings {
        &self.settings
    }

    /// Creates a computer and assigns it to the employee named by `employee_abbrev`.
    ///
    /// The employee lookup, the insert, the link write, and the quota count form one
    /// transaction, so an unknown employee or a duplicate MAC address stores nothing.
    /// When the count (including the new computer) reaches the quota, an administrator
    /// is notified once the transaction has committed. If that delivery fails the
    /// computer and its link are deleted again and the notification error is returned.
    ///
    /// # Errors
    /// `Validation`, `DuplicateKey` (MAC address in use), `EmployeeNotFound`,
    /// `Notification`, or `Database`.
    #[instrument(skip(self, new), fields(mac = %new.mac_address, employee = %new.employee_abbrev))]
    pub async fn create_computer(&self, new: NewComputer) -> Result<i64> {
        computer::validate_new_computer(&new)?;
        let abbreviation = new.employee_abbrev.trim();

        let txn = self.db.begin().await?;
        let owner = employee::require_employee_by_abbreviation(&txn, abbreviation).await?;
        let created = computer::insert_computer(&txn, &new).await?;
        computer::upsert_owner_link(&txn, created.id, owner.id).await?;
        let count =
            employee::count_computers_by_employee_abbreviation(&txn, &owner.abbreviation).await?;
        txn.commit().await?;

        let list_key = employee_computers_key(&owner.abbreviation);
        if count >= self.settings.quota {
            let message = quota_message(&owner.abbreviation, count);
            warn!(count, quota = self.settings.quota, "{}", message);
            if let Err(e) = self
                .notifier
                .notify_system_administrator(&owner.abbreviation, &message)
                .await
            {
                error!(
                    computer_id = created.id,
                    "Notification failed, discarding computer: {}", e
                );
                self.discard_computer(created.id).await?;
                self.evict_stale([computer_key(created.id), list_key]).await;
                return Err(e.into());
            }
        }

        info!(
            computer_id = created.id,
            "Computer created and assigned to {}", owner.abbreviation
        );
        self.evict_stale([list_key]).await;
        Ok(created.id)
    }

    /// Undoes a committed creation: removes the link and the computer row together.
    async fn discard_computer(&self, computer_id: i64) -> Result<()> {
        let txn = self.db.begin().await?;
        computer::delete_owner_link(&txn, computer_id).await?;
        computer::delete_computer_row(&txn, computer_id).await?;
        txn.commit().await?;
        Ok(())
    }

    /// Returns a computer by id, preferring a cached copy.
    ///
    /// A cached copy may be up to the record TTL stale. A store hit is written back to
    /// the cache; a missing computer is reported without caching anything.
    #[instrument(skip(self))]
    pub async fn get_computer(&self, computer_id: i64) -> Result<entities::ComputerModel> {
        let key = computer_key(computer_id);
        read_through(&self.cache, &key, &self.settings.record_cache, || async move {
            computer::get_computer_by_id(&self.db, computer_id)
                .await?
                .ok_or(Error::ComputerNotFound { id: computer_id })
        })
        .await
    }

    /// Returns every computer currently linked to the employee, preferring a cached list.
    #[instrument(skip(self))]
    pub async fn list_computers_by_employee(
        &self,
        abbreviation: &str,
    ) -> Result<Vec<entities::ComputerModel>> {
        let abbreviation = abbreviation.trim();
        let key = employee_computers_key(abbreviation);
        read_through(&self.cache, &key, &self.settings.list_cache, || async move {
            let owner = employee::require_employee_by_abbreviation(&self.db, abbreviation).await?;
            computer::get_computers_for_employee(&self.db, &owner).await
        })
        .await
    }

    /// Makes `abbreviation` the current owner of the computer.
    ///
    /// Inserts the canonical link when the computer has none, moves it in place when it
    /// points at someone else, and does nothing when it already points at the target.
    /// The read and the write of the link share one transaction, and the write is an
    /// upsert keyed on the computer id, so concurrent calls never leave two links.
    ///
    /// # Errors
    /// `ComputerNotFound`, `EmployeeNotFound`, or `Database`.
    #[instrument(skip(self))]
    pub async fn reassign_computer(
        &self,
        computer_id: i64,
        abbreviation: &str,
    ) -> Result<Reassignment> {
        let abbreviation = abbreviation.trim();
        self.get_computer(computer_id).await?;

        let txn = self.db.begin().await?;
        // The cached copy can outlive the row.
        let stored = computer::get_computer_by_id(&txn, computer_id)
            .await?
            .ok_or(Error::ComputerNotFound { id: computer_id })?;
        let target = employee::require_employee_by_abbreviation(&txn, abbreviation).await?;

        let mut stale = vec![
            computer_key(computer_id),
            employee_computers_key(&target.abbreviation),
        ];
        if let Some(hint) = stored.employee_abbrev.as_deref() {
            stale.push(employee_computers_key(hint));
        }

        let outcome = match computer::get_owner_link(&txn, computer_id).await? {
            Some(link) if link.employee_id == target.id => Reassignment::Unchanged,
            Some(link) => {
                computer::update_owner_link(&txn, computer_id, target.id).await?;
                if let Some(previous) = employee::get_employee_by_id(&txn, link.employee_id).await?
                {
                    stale.push(employee_computers_key(&previous.abbreviation));
                }
                Reassignment::Updated {
                    previous_employee_id: link.employee_id,
                }
            }
            None => {
                computer::upsert_owner_link(&txn, computer_id, target.id).await?;
                Reassignment::Inserted
            }
        };

        let hint_is_current = stored.employee_abbrev.as_deref() == Some(&*target.abbreviation);
        if !hint_is_current {
            computer::set_employee_abbrev(&txn, computer_id, Some(&target.abbreviation)).await?;
        }
        txn.commit().await?;

        if outcome == Reassignment::Unchanged && hint_is_current {
            return Ok(outcome);
        }
        info!(?outcome, "Computer {} assigned to {}", computer_id, target.abbreviation);
        self.evict_stale(stale).await;
        Ok(outcome)
    }

    /// Deletes a computer and its ownership link.
    ///
    /// # Errors
    /// `ComputerNotFound` if no computer has the id, otherwise `Database`.
    #[instrument(skip(self))]
    pub async fn delete_computer(&self, computer_id: i64) -> Result<()> {
        let txn = self.db.begin().await?;
        let stored = computer::get_computer_by_id(&txn, computer_id)
            .await?
            .ok_or(Error::ComputerNotFound { id: computer_id })?;

        let mut stale = vec![computer_key(computer_id)];
        if let Some(hint) = stored.employee_abbrev.as_deref() {
            stale.push(employee_computers_key(hint));
        }
        if let Some(link) = computer::get_owner_link(&txn, computer_id).await? {
            if let Some(owner) = employee::get_employee_by_id(&txn, link.employee_id).await? {
                stale.push(employee_computers_key(&owner.abbreviation));
            }
            computer::delete_owner_link(&txn, computer_id).await?;
        }

        computer::delete_computer_row(&txn, computer_id).await?;
        txn.commit().await?;

        info!("Computer {} deleted", computer_id);
        self.evict_stale(stale).await;
        Ok(())
    }

    /// Removes the employee's ownership of a computer, leaving the computer in place
    /// without an owner.
    ///
    /// # Errors
    /// `EmployeeNotFound`, `LinkNotFound` when the employee does not own the computer,
    /// or `Database`.
    #[instrument(skip(self))]
    pub async fn delete_employee_computer(&self, computer_id: i64, abbreviation: &str) -> Result<()> {
        let abbreviation = abbreviation.trim();
        let txn = self.db.begin().await?;
        let owner = employee::require_employee_by_abbreviation(&txn, abbreviation).await?;

        let removed = computer::delete_owner_link_for(&txn, computer_id, owner.id).await?;
        if removed == 0 {
            return Err(Error::LinkNotFound {
                computer_id,
                abbreviation: owner.abbreviation,
            });
        }

        if let Some(stored) = computer::get_computer_by_id(&txn, computer_id).await? {
            if stored.employee_abbrev.as_deref() == Some(&*owner.abbreviation) {
                computer::set_employee_abbrev(&txn, computer_id, None).await?;
            }
        }
        txn.commit().await?;

        info!(
            "Computer {} unassigned from {}",
            computer_id, owner.abbreviation
        );
        self.evict_stale([
            computer_key(computer_id),
            employee_computers_key(&owner.abbreviation),
        ])
        .await;
        Ok(())
    }

    /// Lists every computer straight from the store.
    pub async fn get_all_computers(&self) -> Result<Vec<entities::ComputerModel>> {
        computer::get_all_computers(&self.db).await
    }

    /// Creates an employee.
    pub async fn create_employee(&self, new: NewEmployee) -> Result<entities::EmployeeModel> {
        employee::create_employee(&self.db, new).await
    }

    /// Finds an employee by abbreviation.
    pub async fn find_employee(&self, abbreviation: &str) -> Result<entities::EmployeeModel> {
        employee::require_employee_by_abbreviation(&self.db, abbreviation.trim()).await
    }

    /// Counts the computers whose owner hint names the employee.
    pub async fn count_computers(&self, abbreviation: &str) -> Result<u64> {
        employee::count_computers_by_employee_abbreviation(&self.db, abbreviation.trim()).await
    }

    async fn evict_stale<I>(&self, keys: I)
    where
        I: IntoIterator<Item = String>,
    {
        if !self.settings.evict_on_write {
            return;
        }
        let mut keys: Vec<String> = keys.into_iter().collect();
        keys.sort_unstable();
        keys.dedup();
        evict(&self.cache, keys).await;
    }
}
