use crate::{
    db_types::{EventStat, Pagination, Registration, RegistrationFilter, RegistrationOverview, Sorting},
    traits::StoreError,
};

/// Read-only queries backing the admin dashboard. Returned registrations always include their team members.
#[allow(async_fn_in_trait)]
pub trait RegistrationQueries {
    /// Fetches the registrations matching `filter`, in the requested order. If `page` is `None`, every match is
    /// returned.
    async fn fetch_registrations(
        &self,
        filter: &RegistrationFilter,
        sorting: Sorting,
        page: Option<Pagination>,
    ) -> Result<Vec<Registration>, StoreError>;

    async fn count_registrations(&self, filter: &RegistrationFilter) -> Result<i64, StoreError>;

    /// The distinct event names that have at least one registration, in alphabetical order.
    async fn registered_events(&self) -> Result<Vec<String>, StoreError>;

    async fn registration_overview(&self) -> Result<RegistrationOverview, StoreError>;

    /// Registration count and fee total per event, busiest event first.
    async fn event_statistics(&self) -> Result<Vec<EventStat>, StoreError>;
}
