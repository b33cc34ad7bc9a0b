//! Screen rendering: maps a screen + symbol to cached resource fetches and lays
//! the fields out as text.

pub mod page;

pub use page::Page;

use crate::{
    cache::{normalize_symbol, Category, ReadThroughCache, ResourceKey, TtlPolicy},
    error::RemoteFetchError,
    iex::{
        CompanyInfo, Dividend, InsiderTransaction, InstitutionalHolding, KeyStats, Logo,
        NewsArticle, QuarterlyFundamentals, StockDataSource, DEFAULT_DIVIDEND_RANGE,
        DEFAULT_FUNDAMENTALS_PERIOD,
    },
    stocktwits::SocialFeed,
    utils::{format_epoch_millis, format_optional_number},
};
use log::{debug, error};
use serde::{de::DeserializeOwned, Serialize};
use std::{fmt, future::Future, sync::Arc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Screen {
    Overview,
    Fundamentals,
    Technicals,
    News,
    Ownership,
    Stocktwits,
}

impl Screen {
    pub fn title(&self) -> &'static str {
        match self {
            Screen::Overview => "Overview",
            Screen::Fundamentals => "Fundamentals",
            Screen::Technicals => "Technicals",
            Screen::News => "News",
            Screen::Ownership => "Ownership",
            Screen::Stocktwits => "Stocktwits",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

fn text_or_na(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("N/A")
}

fn number_or_na(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "N/A".to_string())
}

pub struct Dashboard {
    cache: ReadThroughCache,
    source: Arc<dyn StockDataSource>,
    feed: Arc<dyn SocialFeed>,
    ttl_policy: TtlPolicy,
    news_count: usize,
}

impl Dashboard {
    pub fn new(
        cache: ReadThroughCache,
        source: Arc<dyn StockDataSource>,
        feed: Arc<dyn SocialFeed>,
        ttl_policy: TtlPolicy,
    ) -> Self {
        Self {
            cache,
            source,
            feed,
            ttl_policy,
            news_count: 10,
        }
    }

    pub fn with_news_count(mut self, news_count: usize) -> Self {
        self.news_count = news_count.max(1);
        self
    }

    pub fn cache(&self) -> &ReadThroughCache {
        &self.cache
    }

    async fn cached<T, F, Fut>(
        &self,
        symbol: &str,
        category: Category,
        loader: F,
    ) -> Result<T, RemoteFetchError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, RemoteFetchError>>,
    {
        let key = ResourceKey::new(symbol, category)?;
        self.cache
            .fetch(&key.to_string(), loader, self.ttl_policy.ttl_for(key.category()))
            .await
    }

    pub async fn logo(&self, symbol: &str) -> Result<Logo, RemoteFetchError> {
        self.cached(symbol, Category::Logo, || self.source.get_logo(symbol))
            .await
    }

    pub async fn company_info(&self, symbol: &str) -> Result<CompanyInfo, RemoteFetchError> {
        self.cached(symbol, Category::Company, || self.source.get_company_info(symbol))
            .await
    }

    pub async fn stats(&self, symbol: &str) -> Result<KeyStats, RemoteFetchError> {
        self.cached(symbol, Category::Stats, || self.source.get_stats(symbol))
            .await
    }

    pub async fn fundamentals(
        &self,
        symbol: &str,
    ) -> Result<Vec<QuarterlyFundamentals>, RemoteFetchError> {
        self.cached(symbol, Category::Fundamentals, || {
            self.source.get_fundamentals(symbol, DEFAULT_FUNDAMENTALS_PERIOD)
        })
        .await
    }

    pub async fn dividends(&self, symbol: &str) -> Result<Vec<Dividend>, RemoteFetchError> {
        self.cached(symbol, Category::Dividends, || {
            self.source.get_dividends(symbol, DEFAULT_DIVIDEND_RANGE)
        })
        .await
    }

    pub async fn news(&self, symbol: &str) -> Result<Vec<NewsArticle>, RemoteFetchError> {
        self.cached(symbol, Category::News, || {
            self.source.get_company_news(symbol, self.news_count)
        })
        .await
    }

    pub async fn institutional_ownership(
        &self,
        symbol: &str,
    ) -> Result<Vec<InstitutionalHolding>, RemoteFetchError> {
        self.cached(symbol, Category::Institutional, || {
            self.source.get_institutional_ownership(symbol)
        })
        .await
    }

    pub async fn insider_transactions(
        &self,
        symbol: &str,
    ) -> Result<Vec<InsiderTransaction>, RemoteFetchError> {
        self.cached(symbol, Category::InsiderTransactions, || {
            self.source.get_insider_transactions(symbol)
        })
        .await
    }

    /// Renders `screen` for `symbol`.
    ///
    /// Only an invalid symbol fails the whole call; a section whose data cannot be
    /// loaded renders an error line and the rest of the screen still renders.
    pub async fn render(&self, screen: Screen, symbol: &str) -> Result<String, RemoteFetchError> {
        let symbol = normalize_symbol(symbol)?;
        debug!("Rendering {} for {}", screen, symbol);
        let mut page = Page::new(screen.title());

        match screen {
            Screen::Overview => self.render_overview(&mut page, &symbol).await,
            Screen::Fundamentals => self.render_fundamentals(&mut page, &symbol).await,
            Screen::Technicals => render_technicals(&mut page),
            Screen::News => self.render_news(&mut page, &symbol).await,
            Screen::Ownership => self.render_ownership(&mut page, &symbol).await,
            Screen::Stocktwits => self.render_stocktwits(&mut page, &symbol).await,
        }

        Ok(page.finish())
    }

    async fn render_overview(&self, page: &mut Page, symbol: &str) {
        match self.logo(symbol).await {
            Ok(logo) => page.image(&logo.url),
            Err(e) => section_failed(page, "logo", symbol, &e),
        }

        match self.company_info(symbol).await {
            Ok(company) => {
                page.subheader(&company.company_name);
                page.line(text_or_na(&company.industry));
                page.field("Description", text_or_na(&company.description));
                page.field("CEO", text_or_na(&company.ceo));
            }
            Err(e) => section_failed(page, "company info", symbol, &e),
        }
    }

    async fn render_fundamentals(&self, page: &mut Page, symbol: &str) {
        page.header("Ratios");
        match self.stats(symbol).await {
            Ok(stats) => {
                page.field("P/E", number_or_na(stats.pe_ratio));
                page.field("Forward P/E", number_or_na(stats.forward_pe_ratio));
                page.field("PEG Ratio", number_or_na(stats.peg_ratio));
                page.field("Price to Sales", number_or_na(stats.price_to_sales));
                page.field("Price to Book", number_or_na(stats.price_to_book));
                page.field("Revenue", format_optional_number(stats.revenue));
                page.field("Cash", format_optional_number(stats.total_cash));
                page.field("Debt", format_optional_number(stats.current_debt));
                page.field("200 Day Moving Average", number_or_na(stats.day_200_moving_avg));
                page.field("50 Day Moving Average", number_or_na(stats.day_50_moving_avg));
            }
            Err(e) => section_failed(page, "stats", symbol, &e),
        }

        match self.fundamentals(symbol).await {
            Ok(quarters) => {
                for quarter in &quarters {
                    page.header(format!("Q{} {}", quarter.fiscal_quarter, quarter.fiscal_year));
                    page.field("Filing Date", text_or_na(&quarter.filing_date));
                    page.field("Revenue", format_optional_number(quarter.revenue));
                    page.field("Net Income", format_optional_number(quarter.income_net));
                }
            }
            Err(e) => section_failed(page, "fundamentals", symbol, &e),
        }

        page.header("Dividends");
        match self.dividends(symbol).await {
            Ok(dividends) => {
                for dividend in &dividends {
                    page.line(&dividend.payment_date);
                    page.line(dividend.amount);
                }
            }
            Err(e) => section_failed(page, "dividends", symbol, &e),
        }
    }

    async fn render_news(&self, page: &mut Page, symbol: &str) {
        match self.news(symbol).await {
            Ok(articles) => {
                for article in &articles {
                    page.subheader(&article.headline);
                    page.line(format!(
                        "Posted by {} at {}",
                        article.source,
                        format_epoch_millis(article.datetime)
                    ));
                    page.line(&article.url);
                    page.line(&article.summary);
                    if let Some(image) = &article.image {
                        page.image(image);
                    }
                }
            }
            Err(e) => section_failed(page, "news", symbol, &e),
        }
    }

    async fn render_ownership(&self, page: &mut Page, symbol: &str) {
        page.header("Institutional Ownership");
        match self.institutional_ownership(symbol).await {
            Ok(holdings) => {
                for holding in &holdings {
                    page.line(&holding.date);
                    page.line(&holding.entity_proper_name);
                    page.line(holding.reported_holding);
                }
            }
            Err(e) => section_failed(page, "institutional ownership", symbol, &e),
        }

        page.header("Insider Transactions");
        match self.insider_transactions(symbol).await {
            Ok(transactions) => {
                for tx in &transactions {
                    page.line(&tx.filing_date);
                    page.line(&tx.full_name);
                    page.line(number_or_na(tx.transaction_shares));
                    page.line(number_or_na(tx.transaction_price));
                }
            }
            Err(e) => section_failed(page, "insider transactions", symbol, &e),
        }
    }

    async fn render_stocktwits(&self, page: &mut Page, symbol: &str) {
        match self.feed.symbol_stream(symbol).await {
            Ok(messages) => {
                for message in &messages {
                    if let Some(avatar) = &message.user.avatar_url {
                        page.image(avatar);
                    }
                    page.line(&message.user.username);
                    page.line(&message.created_at);
                    page.line(&message.body);
                }
            }
            Err(e) => section_failed(page, "StockTwits stream", symbol, &e),
        }
    }
}

fn render_technicals(page: &mut Page) {
    page.subheader("Company technical data coming soon. This will include:");
    page.line("- OHLCV data and charts");
    page.line("- Momentum and volatility indicators");
}

fn section_failed(page: &mut Page, section: &str, symbol: &str, err: &RemoteFetchError) {
    error!("Failed to load {} for {}: {}", section, symbol, err);
    page.error(section, err);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_titles() {
        assert_eq!(Screen::Stocktwits.to_string(), "Stocktwits");
        assert_eq!(Screen::Overview.title(), "Overview");
    }

    #[test]
    fn test_number_or_na() {
        assert_eq!(number_or_na(Some(28.51)), "28.51");
        assert_eq!(number_or_na(None), "N/A");
    }
}
