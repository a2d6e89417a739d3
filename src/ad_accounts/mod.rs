pub mod params;

use crate::error::Error;
use crate::requester::{Context, QueryParams};
use crate::types::{Collection, Model, ModelKind};

pub use self::params::*;

/// Service for the ad account endpoints.
///
/// Access via `client.ad_accounts()`, or from an already fetched model via
/// [`AdAccountService::from_model`]. Every method issues exactly one GET;
/// later pages are fetched with [`Collection::fetch_next`].
#[derive(Clone)]
pub struct AdAccountService {
    context: Context,
}

impl AdAccountService {
    pub fn new(context: Context) -> Self {
        Self { context }
    }

    /// Reuse the requester a model was fetched with.
    ///
    /// Returns `None` for models built without a context.
    pub fn from_model(model: &Model) -> Option<Self> {
        model.context().cloned().map(Self::new)
    }

    /// List the ad accounts the token has access to.
    ///
    /// Calls `GET /v5/ad_accounts/`.
    pub async fn list(&self, params: impl Into<QueryParams>) -> Result<Collection, Error> {
        self.collection("ad_accounts/".to_string(), params.into(), ModelKind::AdAccount)
            .await
    }

    /// Get a single ad account.
    ///
    /// Calls `GET /v5/ad_accounts/{ad_account_id}/`.
    pub async fn get(
        &self,
        ad_account_id: &str,
        params: impl Into<QueryParams>,
    ) -> Result<Model, Error> {
        let path = format!("ad_accounts/{}/", ad_account_id);
        let raw = self.context.get(&path, &params.into()).await?;
        Model::new(Some(self.context.clone()), ModelKind::AdAccount, raw)
    }

    /// Ad account analytics.
    ///
    /// Calls `GET /v5/ad_accounts/{ad_account_id}/analytics/`.
    pub async fn analytics(
        &self,
        ad_account_id: &str,
        params: impl Into<QueryParams>,
    ) -> Result<Collection, Error> {
        self.scoped(ad_account_id, "analytics/", params, ModelKind::Analytics)
            .await
    }

    /// List campaigns.
    ///
    /// Calls `GET /v5/ad_accounts/{ad_account_id}/campaigns/`.
    pub async fn campaigns(
        &self,
        ad_account_id: &str,
        params: impl Into<QueryParams>,
    ) -> Result<Collection, Error> {
        self.scoped(ad_account_id, "campaigns/", params, ModelKind::Campaign)
            .await
    }

    /// Campaign analytics.
    ///
    /// Calls `GET /v5/ad_accounts/{ad_account_id}/campaigns/analytics/`.
    pub async fn campaigns_analytics(
        &self,
        ad_account_id: &str,
        params: impl Into<QueryParams>,
    ) -> Result<Collection, Error> {
        self.scoped(ad_account_id, "campaigns/analytics/", params, ModelKind::Analytics)
            .await
    }

    /// List ad groups.
    ///
    /// Calls `GET /v5/ad_accounts/{ad_account_id}/ad_groups/`.
    pub async fn ad_groups(
        &self,
        ad_account_id: &str,
        params: impl Into<QueryParams>,
    ) -> Result<Collection, Error> {
        self.scoped(ad_account_id, "ad_groups/", params, ModelKind::AdGroup)
            .await
    }

    /// Ad group analytics.
    ///
    /// Calls `GET /v5/ad_accounts/{ad_account_id}/ad_groups/analytics/`.
    pub async fn ad_groups_analytics(
        &self,
        ad_account_id: &str,
        params: impl Into<QueryParams>,
    ) -> Result<Collection, Error> {
        self.scoped(ad_account_id, "ad_groups/analytics/", params, ModelKind::Analytics)
            .await
    }

    /// List ads.
    ///
    /// Calls `GET /v5/ad_accounts/{ad_account_id}/ads/`.
    pub async fn ads(
        &self,
        ad_account_id: &str,
        params: impl Into<QueryParams>,
    ) -> Result<Collection, Error> {
        self.scoped(ad_account_id, "ads/", params, ModelKind::Ad).await
    }

    /// Ad analytics.
    ///
    /// Calls `GET /v5/ad_accounts/{ad_account_id}/ads/analytics/`.
    pub async fn ads_analytics(
        &self,
        ad_account_id: &str,
        params: impl Into<QueryParams>,
    ) -> Result<Collection, Error> {
        self.scoped(ad_account_id, "ads/analytics/", params, ModelKind::Analytics)
            .await
    }

    async fn scoped(
        &self,
        ad_account_id: &str,
        resource: &str,
        params: impl Into<QueryParams>,
        kind: ModelKind,
    ) -> Result<Collection, Error> {
        let path = format!("ad_accounts/{}/{}", ad_account_id, resource);
        self.collection(path, params.into(), kind).await
    }

    async fn collection(
        &self,
        path: String,
        query: QueryParams,
        kind: ModelKind,
    ) -> Result<Collection, Error> {
        let raw = self.context.get(&path, &query).await?;
        Collection::new(self.context.clone(), path, query, raw, kind)
    }
}

impl std::fmt::Debug for AdAccountService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdAccountService").finish_non_exhaustive()
    }
}
