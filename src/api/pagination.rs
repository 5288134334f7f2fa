use sea_orm::{ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, Select};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::ApiError;

#[derive(Deserialize, Debug, Default)]
pub struct PageQuery {
    pub page: Option<String>,
    pub page_size: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: u64,
    pub page_size: u64,
}

impl PageParams {
    pub fn parse(
        page: Option<&str>,
        page_size: Option<&str>,
        config: &Config,
    ) -> Result<Self, ApiError> {
        let page = positive("page", page)?.unwrap_or(1);
        let page_size = positive("page_size", page_size)?
            .unwrap_or(config.page_size)
            .min(config.max_page_size);
        Ok(PageParams { page, page_size })
    }

    pub fn from_query(query: &PageQuery, config: &Config) -> Result<Self, ApiError> {
        Self::parse(query.page.as_deref(), query.page_size.as_deref(), config)
    }
}

fn positive(name: &str, raw: Option<&str>) -> Result<Option<u64>, ApiError> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(None),
        Some(value) => match value.parse::<u64>() {
            Ok(parsed) if parsed > 0 => Ok(Some(parsed)),
            _ => Err(ApiError::Validation(format!(
                "{name} must be a positive integer, got '{value}'"
            ))),
        },
    }
}

#[derive(Serialize, Debug)]
pub struct Page<T> {
    pub count: u64,
    pub page: u64,
    pub page_size: u64,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        self.with_results(|results| results.into_iter().map(f).collect())
    }

    /// Replaces the page contents, keeping the envelope.
    pub fn with_results<U>(self, f: impl FnOnce(Vec<T>) -> Vec<U>) -> Page<U> {
        Page {
            count: self.count,
            page: self.page,
            page_size: self.page_size,
            results: f(self.results),
        }
    }
}

pub async fn fetch_page<E, C>(
    db: &C,
    select: Select<E>,
    params: PageParams,
) -> Result<Page<E::Model>, DbErr>
where
    E: EntityTrait,
    E::Model: Sync,
    C: ConnectionTrait,
{
    let paginator = select.paginate(db, params.page_size);
    let count = paginator.num_items().await?;
    let results = paginator.fetch_page(params.page - 1).await?;

    Ok(Page {
        count,
        page: params.page,
        page_size: params.page_size,
        results,
    })
}
