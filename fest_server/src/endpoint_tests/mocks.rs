use fest_engine::{
    db_types::{
        EventStat,
        NewRegistration,
        Pagination,
        Registration,
        RegistrationFilter,
        RegistrationOverview,
        Sorting,
    },
    notifications::{MailMessage, MessageTransport, TransportError},
    traits::{RegistrationManagement, RegistrationQueries, StoreError},
};
use mockall::mock;
use razorpay_tools::{NewOrder, OrderIssuer, RazorpayApiError, RazorpayOrder};

mock! {
    pub RegistrationStore {}
    impl RegistrationManagement for RegistrationStore {
        async fn registration_exists(&self, event: &str, email: &str, mobile: &str) -> Result<bool, StoreError>;
        async fn insert_registration(&self, registration: NewRegistration) -> Result<Registration, StoreError>;
    }
    impl RegistrationQueries for RegistrationStore {
        async fn fetch_registrations(&self, filter: &RegistrationFilter, sorting: Sorting, page: Option<Pagination>) -> Result<Vec<Registration>, StoreError>;
        async fn count_registrations(&self, filter: &RegistrationFilter) -> Result<i64, StoreError>;
        async fn registered_events(&self) -> Result<Vec<String>, StoreError>;
        async fn registration_overview(&self) -> Result<RegistrationOverview, StoreError>;
        async fn event_statistics(&self) -> Result<Vec<EventStat>, StoreError>;
    }
}

mock! {
    pub Mailer {}
    impl MessageTransport for Mailer {
        async fn send(&self, message: MailMessage) -> Result<(), TransportError>;
    }
}

mock! {
    pub Gateway {}
    impl OrderIssuer for Gateway {
        async fn create_order(&self, order: NewOrder) -> Result<RazorpayOrder, RazorpayApiError>;
    }
}
