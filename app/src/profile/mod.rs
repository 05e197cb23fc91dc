use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, watch};

use crate::core::persistence::SettingRepository;

const BILLING_PROFILE_KEY: &str = "billing_profile";
const DEMO_MODE_KEY: &str = "demo_mode";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingProfile {
    /// Currency per kWh
    pub electricity_rate: f64,
    #[serde(default)]
    pub monthly_bill_limit: Option<f64>,
}

impl Default for BillingProfile {
    fn default() -> Self {
        Self {
            electricity_rate: 7.0,
            monthly_bill_limit: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ProfileError {
    #[display("Invalid electricity rate {_0}, must be a positive number")]
    InvalidRate(#[error(not(source))] f64),
    #[display("Invalid monthly bill limit {_0}, must not be negative")]
    InvalidBillLimit(#[error(not(source))] f64),
}

impl BillingProfile {
    pub fn validate(&self) -> Result<(), ProfileError> {
        if !self.electricity_rate.is_finite() || self.electricity_rate <= 0.0 {
            return Err(ProfileError::InvalidRate(self.electricity_rate));
        }

        match self.monthly_bill_limit {
            Some(limit) if !limit.is_finite() || limit < 0.0 => Err(ProfileError::InvalidBillLimit(limit)),
            _ => Ok(()),
        }
    }
}

struct ProfileState {
    repo: SettingRepository,
    billing: watch::Sender<BillingProfile>,
    demo_mode: watch::Sender<bool>,
    write_lock: Mutex<()>,
}

#[derive(Clone)]
pub struct ProfileClient {
    state: Arc<ProfileState>,
}

impl ProfileClient {
    pub async fn load(pool: sqlx::SqlitePool) -> anyhow::Result<Self> {
        let repo = SettingRepository::new(pool);

        let billing = repo.get::<BillingProfile>(BILLING_PROFILE_KEY).await?.unwrap_or_default();
        let demo_mode = repo.get::<bool>(DEMO_MODE_KEY).await?.unwrap_or(false);

        tracing::info!("Loaded billing profile {:?}, demo mode {}", billing, demo_mode);

        Ok(Self {
            state: Arc::new(ProfileState {
                repo,
                billing: watch::Sender::new(billing),
                demo_mode: watch::Sender::new(demo_mode),
                write_lock: Mutex::new(()),
            }),
        })
    }

    pub fn billing(&self) -> BillingProfile {
        self.state.billing.borrow().clone()
    }

    pub fn demo_mode(&self) -> bool {
        *self.state.demo_mode.borrow()
    }

    pub fn watch_demo_mode(&self) -> watch::Receiver<bool> {
        self.state.demo_mode.subscribe()
    }

    /// Fails with [`ProfileError`] for invalid values, the stored profile stays unchanged then.
    pub async fn set_billing(&self, profile: BillingProfile) -> anyhow::Result<BillingProfile> {
        profile.validate()?;

        let _guard = self.state.write_lock.lock().await;
        self.state.repo.set(BILLING_PROFILE_KEY, &profile).await?;
        self.state.billing.send_replace(profile.clone());

        tracing::info!("Billing profile updated to {:?}", profile);
        Ok(profile)
    }

    pub async fn set_demo_mode(&self, enabled: bool) -> anyhow::Result<()> {
        let _guard = self.state.write_lock.lock().await;
        self.state.repo.set(DEMO_MODE_KEY, &enabled).await?;
        self.state.demo_mode.send_replace(enabled);

        tracing::info!("Demo mode {}", if enabled { "enabled" } else { "disabled" });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_rate_and_limit() {
        let valid = BillingProfile {
            electricity_rate: 8.5,
            monthly_bill_limit: Some(0.0),
        };
        assert_eq!(valid.validate(), Ok(()));

        let zero_rate = BillingProfile {
            electricity_rate: 0.0,
            ..valid.clone()
        };
        assert_eq!(zero_rate.validate(), Err(ProfileError::InvalidRate(0.0)));

        let nan_rate = BillingProfile {
            electricity_rate: f64::NAN,
            ..valid.clone()
        };
        assert!(matches!(nan_rate.validate(), Err(ProfileError::InvalidRate(_))));

        let negative_limit = BillingProfile {
            monthly_bill_limit: Some(-1.0),
            ..valid
        };
        assert_eq!(negative_limit.validate(), Err(ProfileError::InvalidBillLimit(-1.0)));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn defaults_when_nothing_stored(pool: sqlx::SqlitePool) {
        let profile = ProfileClient::load(pool).await.unwrap();

        assert_eq!(profile.billing(), BillingProfile::default());
        assert!(!profile.demo_mode());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn invalid_profile_is_rejected_and_not_stored(pool: sqlx::SqlitePool) {
        let profile = ProfileClient::load(pool.clone()).await.unwrap();

        let err = profile
            .set_billing(BillingProfile {
                electricity_rate: -3.0,
                monthly_bill_limit: None,
            })
            .await
            .unwrap_err();

        assert_eq!(err.downcast_ref::<ProfileError>(), Some(&ProfileError::InvalidRate(-3.0)));
        assert_eq!(ProfileClient::load(pool).await.unwrap().billing(), BillingProfile::default());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn settings_survive_reload(pool: sqlx::SqlitePool) {
        let profile = ProfileClient::load(pool.clone()).await.unwrap();
        let mut demo_rx = profile.watch_demo_mode();

        let billing = BillingProfile {
            electricity_rate: 9.25,
            monthly_bill_limit: Some(1500.0),
        };
        profile.set_billing(billing.clone()).await.unwrap();
        profile.set_demo_mode(true).await.unwrap();

        assert!(demo_rx.has_changed().unwrap());
        assert!(*demo_rx.borrow_and_update());

        let reloaded = ProfileClient::load(pool).await.unwrap();
        assert_eq!(reloaded.billing(), billing);
        assert!(reloaded.demo_mode());
    }
}
