use crate::assets::{GeocodeTable, UrlRegistry};
use crate::collection::AlertCollection;
use crate::config::Config;
use crate::error::Error;
use crate::feed::{CountryFeed, FetchPolicy};
use reqwest::redirect::Policy;
use url::Url;

const MAX_REDIRECTS: usize = 5;

fn redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            return attempt.error("Too many redirects");
        }

        let url = attempt.url();
        if attempt.previous().iter().any(|prev| prev == url) {
            return attempt.error("Redirect loop detected");
        }

        tracing::debug!(
            to = %url,
            hop = attempt.previous().len() + 1,
            "Following redirect"
        );
        attempt.follow()
    })
}

/// Fetches MeteoAlarm warnings for one or more countries.
///
/// ```no_run
/// # async fn run() -> Result<(), meteoalarm::Error> {
/// use meteoalarm::{Filter, MeteoAlarm};
///
/// let client = MeteoAlarm::new()?;
/// let alerts = client.fetch(&["estonia", "denmark"]).await?;
/// let severe = alerts.filter(&Filter::new().with("severity", "Severe"));
/// for alert in &severe {
///     println!("{alert}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MeteoAlarm {
    registry: UrlRegistry,
    geocodes: GeocodeTable,
    http: reqwest::Client,
    policy: FetchPolicy,
    concurrency: usize,
}

impl MeteoAlarm {
    /// Client with the bundled tables and default settings.
    pub fn new() -> Result<Self, Error> {
        Self::from_config(&Config::default())
    }

    /// Client configured from `config`, loading any table overrides it names.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let registry = match &config.urls_file {
            Some(path) => UrlRegistry::from_path(path)?,
            None => UrlRegistry::bundled()?,
        };
        let geocodes = match &config.geocodes_file {
            Some(path) => GeocodeTable::from_path(path)?,
            None => GeocodeTable::bundled()?,
        };
        Self::with_tables(registry, geocodes, config)
    }

    /// Client over caller-supplied tables.
    pub fn with_tables(
        registry: UrlRegistry,
        geocodes: GeocodeTable,
        config: &Config,
    ) -> Result<Self, Error> {
        let policy = config.fetch_policy();
        let http = reqwest::Client::builder()
            .redirect(redirect_policy())
            .user_agent(config.user_agent.as_str())
            .timeout(policy.timeout)
            .pool_max_idle_per_host(config.concurrency.max(1))
            .build()
            .map_err(Error::HttpClient)?;

        Ok(Self {
            registry,
            geocodes,
            http,
            policy,
            concurrency: config.concurrency.max(1),
        })
    }

    pub fn registry(&self) -> &UrlRegistry {
        &self.registry
    }

    pub fn geocodes(&self) -> &GeocodeTable {
        &self.geocodes
    }

    /// Fetches the current warnings for every country, in the order given.
    ///
    /// Country identifiers are matched case-insensitively. The whole list is
    /// validated before any request is made. A country whose feed cannot be
    /// fetched or parsed contributes no alerts; it does not fail the call.
    ///
    /// Must be awaited on a tokio runtime; the HTTP client is reqwest's async one.
    ///
    /// # Errors
    ///
    /// - [`Error::NoCountries`] for an empty list
    /// - [`Error::BlankCountry`] for an empty or whitespace-only identifier
    /// - [`Error::UnknownCountry`] for an identifier missing from the registry
    pub async fn fetch<S: AsRef<str>>(&self, countries: &[S]) -> Result<AlertCollection, Error> {
        let targets = self.resolve_all(countries)?;

        let mut alerts = Vec::new();
        for (country, url) in targets {
            alerts.extend(self.fetch_country(&country, url).await);
        }

        tracing::info!(
            countries = countries.len(),
            alerts = alerts.len(),
            "Fetched warnings"
        );
        Ok(AlertCollection::new(alerts))
    }

    fn resolve_all<S: AsRef<str>>(&self, countries: &[S]) -> Result<Vec<(String, &Url)>, Error> {
        if countries.is_empty() {
            return Err(Error::NoCountries);
        }

        countries
            .iter()
            .enumerate()
            .map(|(position, country)| {
                let country = country.as_ref().trim();
                if country.is_empty() {
                    return Err(Error::BlankCountry(position));
                }
                let key = country.to_lowercase();
                match self.registry.resolve(&key) {
                    Some(url) => Ok((key, url)),
                    None => Err(Error::UnknownCountry(country.to_string())),
                }
            })
            .collect()
    }

    async fn fetch_country(&self, country: &str, url: &Url) -> Vec<crate::Alert> {
        let feed = CountryFeed {
            client: &self.http,
            policy: &self.policy,
            geocodes: &self.geocodes,
            concurrency: self.concurrency,
        };

        match feed.collect(country, url.as_str()).await {
            Ok(alerts) => {
                tracing::debug!(country = %country, alerts = alerts.len(), "Fetched country");
                alerts
            }
            Err(e) => {
                tracing::warn!(country = %country, url = %url, error = %e, "Error fetching warnings");
                Vec::new()
            }
        }
    }
}
