use crate::requester::QueryParams;

/// Time bucket for analytics rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Granularity {
    Total,
    Day,
    Hour,
    Week,
    Month,
}

impl Granularity {
    pub fn as_str(self) -> &'static str {
        match self {
            Granularity::Total => "TOTAL",
            Granularity::Day => "DAY",
            Granularity::Hour => "HOUR",
            Granularity::Week => "WEEK",
            Granularity::Month => "MONTH",
        }
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether conversions are reported at ad-action or conversion time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionReportTime {
    TimeOfAdAction,
    TimeOfConversion,
}

impl std::fmt::Display for ConversionReportTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ConversionReportTime::TimeOfAdAction => "TIME_OF_AD_ACTION",
            ConversionReportTime::TimeOfConversion => "TIME_OF_CONVERSION",
        })
    }
}

/// Sort order for list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SortOrder::Ascending => "ASCENDING",
            SortOrder::Descending => "DESCENDING",
        })
    }
}

/// Parameters for the analytics endpoints.
///
/// ```ignore
/// let params = AnalyticsParams::builder()
///     .start_date("2024-01-01")
///     .end_date("2024-01-31")
///     .columns(vec!["SPEND_IN_DOLLAR".into(), "IMPRESSION_1".into()])
///     .granularity(Granularity::Day)
///     .build();
/// ```
///
/// Dates are `YYYY-MM-DD` and passed through unchecked.
#[derive(Debug, Clone, bon::Builder)]
pub struct AnalyticsParams {
    #[builder(into)]
    pub start_date: String,
    #[builder(into)]
    pub end_date: String,
    pub columns: Vec<String>,
    pub granularity: Granularity,
    pub campaign_ids: Option<Vec<String>>,
    pub ad_group_ids: Option<Vec<String>>,
    pub ad_ids: Option<Vec<String>>,
    pub click_window_days: Option<u32>,
    pub engagement_window_days: Option<u32>,
    pub view_window_days: Option<u32>,
    pub conversion_report_time: Option<ConversionReportTime>,
}

impl From<AnalyticsParams> for QueryParams {
    fn from(p: AnalyticsParams) -> Self {
        let mut query = QueryParams::new()
            .with("start_date", p.start_date)
            .with("end_date", p.end_date)
            .with("columns", p.columns.join(","))
            .with("granularity", p.granularity);
        set_list(&mut query, "campaign_ids", p.campaign_ids);
        set_list(&mut query, "ad_group_ids", p.ad_group_ids);
        set_list(&mut query, "ad_ids", p.ad_ids);
        set_opt(&mut query, "click_window_days", p.click_window_days);
        set_opt(&mut query, "engagement_window_days", p.engagement_window_days);
        set_opt(&mut query, "view_window_days", p.view_window_days);
        set_opt(&mut query, "conversion_report_time", p.conversion_report_time);
        query
    }
}

/// Parameters for the paginated list endpoints.
#[derive(Debug, Clone, Default, bon::Builder)]
pub struct ListParams {
    /// Maximum number of items per page.
    pub page_size: Option<u32>,
    /// Start from this cursor instead of the first page.
    #[builder(into)]
    pub bookmark: Option<String>,
    /// e.g. `ACTIVE`, `PAUSED`, `ARCHIVED`.
    pub entity_statuses: Option<Vec<String>>,
    pub order: Option<SortOrder>,
    pub campaign_ids: Option<Vec<String>>,
    pub ad_group_ids: Option<Vec<String>>,
    pub include_shared_accounts: Option<bool>,
}

impl From<ListParams> for QueryParams {
    fn from(p: ListParams) -> Self {
        let mut query = QueryParams::new();
        set_opt(&mut query, "page_size", p.page_size);
        set_opt(&mut query, "bookmark", p.bookmark);
        set_list(&mut query, "entity_statuses", p.entity_statuses);
        set_opt(&mut query, "order", p.order);
        set_list(&mut query, "campaign_ids", p.campaign_ids);
        set_list(&mut query, "ad_group_ids", p.ad_group_ids);
        set_opt(&mut query, "include_shared_accounts", p.include_shared_accounts);
        query
    }
}

fn set_opt(query: &mut QueryParams, key: &str, value: Option<impl std::fmt::Display>) {
    if let Some(value) = value {
        query.set(key, value);
    }
}

fn set_list(query: &mut QueryParams, key: &str, values: Option<Vec<String>>) {
    if let Some(values) = values.filter(|v| !v.is_empty()) {
        query.set(key, values.join(","));
    }
}
