//! Read-only API behind the admin dashboard: listing, spreadsheet export and statistics.
use std::fmt::Debug;

use chrono::Utc;
use log::*;

use crate::{
    db_types::{Pagination, RegistrationFilter, SortField, SortOrder, Sorting},
    fest_api::{
        admin_objects::{
            event_filter,
            parse_date_bound,
            ExportFile,
            ExportParams,
            ListFilters,
            ListParams,
            PaginationInfo,
            RegistrationPage,
            RegistrationStats,
            DEFAULT_PAGE_SIZE,
            MAX_PAGE_SIZE,
            RECENT_REGISTRATIONS,
        },
        errors::AdminApiError,
        export::{build_workbook, export_file_name, XLSX_CONTENT_TYPE},
    },
    traits::RegistrationQueries,
};

pub struct AdminApi<B> {
    db: B,
}

impl<B: Debug> Debug for AdminApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AdminApi ({:?})", self.db)
    }
}

impl<B> AdminApi<B>
where B: RegistrationQueries
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    /// One page of registrations, newest first unless asked otherwise, together with the pagination totals and the
    /// list of events that can be filtered on.
    pub async fn list_registrations(&self, params: ListParams) -> Result<RegistrationPage, AdminApiError> {
        let page = params.page.unwrap_or(1);
        let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE);
        if page < 1 {
            return Err(AdminApiError::InvalidQuery("page must be 1 or greater".into()));
        }
        if limit < 1 {
            return Err(AdminApiError::InvalidQuery("limit must be 1 or greater".into()));
        }
        if limit > MAX_PAGE_SIZE {
            return Err(AdminApiError::InvalidQuery(format!("limit must be {MAX_PAGE_SIZE} or less")));
        }
        let sorting = Sorting::new(
            params.sort_by.as_deref().map(SortField::from_json_name).unwrap_or_default(),
            params.sort_order.as_deref().map(SortOrder::from_param).unwrap_or_default(),
        );
        let mut filter = RegistrationFilter::default();
        if let Some(event) = event_filter(params.event_filter.as_deref()) {
            filter = filter.with_event(event);
        }
        if let Some(search) = params.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            filter = filter.with_search(search);
        }
        trace!("📋️ Listing registrations. Filter: {filter:?}, sorting: {sorting:?}, page {page} of size {limit}");
        let pagination = Pagination { offset: (page - 1).saturating_mul(limit), limit };
        let registrations = self.db.fetch_registrations(&filter, sorting, Some(pagination)).await?;
        let total_count = self.db.count_registrations(&filter).await?;
        let available_events = self.db.registered_events().await?;
        debug!("📋️ Returning {} of {total_count} registrations", registrations.len());
        Ok(RegistrationPage {
            registrations,
            pagination: PaginationInfo::new(page, limit, total_count),
            filters: ListFilters { available_events },
        })
    }

    /// Builds a spreadsheet of every registration matching the event and date range, newest first.
    pub async fn export(&self, params: ExportParams) -> Result<ExportFile, AdminApiError> {
        let event = event_filter(params.event_filter.as_deref());
        let mut filter = RegistrationFilter::default();
        if let Some(event) = &event {
            filter = filter.with_event(event.clone());
        }
        if let Some(start) = params.start_date.as_deref().filter(|s| !s.trim().is_empty()) {
            filter = filter.created_from(parse_date_bound(start, false)?);
        }
        if let Some(end) = params.end_date.as_deref().filter(|s| !s.trim().is_empty()) {
            filter = filter.created_until(parse_date_bound(end, true)?);
        }
        let registrations = self.db.fetch_registrations(&filter, Sorting::default(), None).await?;
        if registrations.is_empty() {
            info!("📊️ Nothing to export for {filter:?}");
            return Err(AdminApiError::NotFound);
        }
        let bytes = build_workbook(&registrations, event.as_deref())?;
        let file_name = export_file_name(event.as_deref(), Utc::now().date_naive())?;
        info!("📊️ Exported {} registrations to {file_name} ({} bytes)", registrations.len(), bytes.len());
        Ok(ExportFile { file_name, content_type: XLSX_CONTENT_TYPE, bytes })
    }

    /// Headline totals, per-event figures and the most recent registrations.
    pub async fn statistics(&self) -> Result<RegistrationStats, AdminApiError> {
        let overview = self.db.registration_overview().await?;
        let event_stats = self.db.event_statistics().await?;
        let recent = Pagination { offset: 0, limit: RECENT_REGISTRATIONS };
        let recent_registrations = self
            .db
            .fetch_registrations(&RegistrationFilter::default(), Sorting::default(), Some(recent))
            .await?
            .into_iter()
            .map(Into::into)
            .collect();
        Ok(RegistrationStats { overview, event_stats, recent_registrations })
    }
}
