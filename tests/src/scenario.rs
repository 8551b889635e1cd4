// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Named end-to-end scenarios and the sequential runner
//!
//! Each scenario acquires its own [DeviceSession], which is stopped on
//! every exit path before the next scenario starts.

use std::{
    fmt::Display,
    time::{Duration, Instant},
};

use log::{error, info};
use strum::{EnumIter, EnumString, IntoEnumIterator};

use ledger_fil_apdu::{address::AddressInfo, StatusCode};
use ledger_fil_sim::Driver;

use crate::{
    approval::{ApprovalFlowController, ApprovalFlowSpec},
    config::Config,
    session::DeviceSession,
    snapshot::SnapshotStore,
    validate::*,
    vectors::*,
    verify::verify,
    HarnessError,
};

/// Start / stop cycles for [Scenario::SessionCycles]
pub const SESSION_CYCLES: usize = 3;

/// Available scenarios
#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Scenario {
    /// Start and stop the emulator
    StartStop,
    /// Fetch and check the app version
    AppVersion,
    /// Fetch and check device info
    DeviceInfo,
    /// Fetch an address and compare with golden values
    GetAddress,
    /// Display and approve an address on-device
    ShowAddress,
    /// Sign and verify a basic transaction
    SignBasic,
    /// Reject a malformed transaction before review
    SignBasicInvalid,
    /// Sign and verify a proposal in expert mode
    SignProposal,
    /// Repeated address requests return identical results
    AddressDeterminism,
    /// Addresses are identical across session restarts
    SessionCycles,
}

impl Scenario {
    /// All scenarios in execution order
    pub fn all() -> Vec<Scenario> {
        Scenario::iter().collect()
    }

    /// Flow name and screen count for scenarios with an approval flow
    pub fn flow(&self) -> Option<ApprovalFlowSpec> {
        match self {
            Scenario::ShowAddress => Some(ApprovalFlowSpec::new(
                "show_address",
                SHOW_ADDRESS_SCREENS,
            )),
            Scenario::SignBasic => Some(ApprovalFlowSpec::new("sign_basic", SIGN_BASIC_SCREENS)),
            Scenario::SignProposal => Some(
                ApprovalFlowSpec::new("sign_proposal", SIGN_PROPOSAL_SCREENS)
                    .with_pre_actions(&EXPERT_MODE),
            ),
            _ => None,
        }
    }
}

/// Scenario outcome
#[derive(Debug)]
pub struct Outcome {
    pub scenario: Scenario,
    pub elapsed: Duration,
    pub result: Result<(), HarnessError>,
}

/// Outcomes for a run
#[derive(Debug, Default)]
pub struct Report {
    pub outcomes: Vec<Outcome>,
}

impl Report {
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.passed()
    }

    pub fn is_ok(&self) -> bool {
        self.failed() == 0
    }

    /// Fetch the outcome for a scenario
    pub fn get(&self, scenario: Scenario) -> Option<&Outcome> {
        self.outcomes.iter().find(|o| o.scenario == scenario)
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for o in &self.outcomes {
            match &o.result {
                Ok(_) => writeln!(f, "PASS {} ({:?})", o.scenario, o.elapsed)?,
                Err(e) => writeln!(f, "FAIL {} ({:?}): {e}", o.scenario, o.elapsed)?,
            }
        }

        write!(f, "{} passed, {} failed", self.passed(), self.failed())
    }
}

/// Sequential scenario runner
pub struct ScenarioRunner<D> {
    driver: D,
    config: Config,
    store: SnapshotStore,
}

impl<D: Driver + Clone> ScenarioRunner<D> {
    pub fn new(driver: D, config: Config) -> Self {
        let store = SnapshotStore::new(
            &config.snapshots,
            &config.snapshots_tmp,
            config.snapshot_mode(),
        );

        Self {
            driver,
            config,
            store,
        }
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Run scenarios in order, continuing past failures
    pub async fn run(&self, scenarios: &[Scenario]) -> Report {
        let mut report = Report::default();

        for s in scenarios {
            info!("Running scenario '{s}'");

            let start = Instant::now();
            let result = self.run_one(*s).await;
            let elapsed = start.elapsed();

            match &result {
                Ok(_) => info!("Scenario '{s}' passed ({elapsed:?})"),
                Err(e) => error!("Scenario '{s}' failed: {e}"),
            }

            report.outcomes.push(Outcome {
                scenario: *s,
                elapsed,
                result,
            });
        }

        report
    }

    /// Run a single scenario with its own session(s)
    pub async fn run_one(&self, scenario: Scenario) -> Result<(), HarnessError> {
        let r = match scenario {
            Scenario::SessionCycles => self.session_cycles().await,
            _ => self.run_session(scenario).await,
        };

        // Timeouts outside an approval flow are attributed to the scenario
        r.map_err(|e| e.or_flow(&scenario.to_string(), 0))
    }

    async fn run_session(&self, scenario: Scenario) -> Result<(), HarnessError> {
        let mut s = self.start().await?;

        let r = self.execute(scenario, &s).await;

        // Teardown is unconditional, scenario errors take precedence
        let t = s.stop().await;
        r?;
        t
    }

    async fn start(&self) -> Result<DeviceSession<D>, HarnessError> {
        DeviceSession::start(
            self.driver.clone(),
            &self.config.app,
            self.config.emulator_options(),
            self.config.timeouts.clone(),
        )
        .await
    }

    async fn execute(&self, scenario: Scenario, s: &DeviceSession<D>) -> Result<(), HarnessError> {
        let c = s.client();

        match scenario {
            Scenario::StartStop | Scenario::SessionCycles => Ok(()),
            Scenario::AppVersion => check_version(expect_ok(&c.version().await?)?),
            Scenario::DeviceInfo => check_device_info(expect_ok(&c.device_info().await?)?),
            Scenario::GetAddress => {
                let a = get_address(s, &ADDRESS_5_0_3).await?;
                check_address(&a, &ADDRESS_5_0_3)
            }
            Scenario::ShowAddress => self.show_address(s).await,
            Scenario::SignBasic => self.sign(s, scenario, TX_BASIC).await,
            Scenario::SignProposal => self.sign(s, scenario, TX_PROPOSAL).await,
            Scenario::SignBasicInvalid => self.sign_invalid(s).await,
            Scenario::AddressDeterminism => {
                for v in [&ADDRESS_5_0_3, &ADDRESS_0_0_1] {
                    let a = get_address(s, v).await?;
                    let b = get_address(s, v).await?;

                    if a != b {
                        return Err(HarnessError::Assertion(format!(
                            "address for {} changed between requests",
                            v.path
                        )));
                    }
                    check_address(&a, v)?;
                }
                Ok(())
            }
        }
    }

    async fn show_address(&self, s: &DeviceSession<D>) -> Result<(), HarnessError> {
        let v = &ADDRESS_5_0_3;
        let p = path(v.path)?;

        let expected = get_address(s, v).await?;

        let spec = flow(Scenario::ShowAddress)?;
        let r = ApprovalFlowController::new(s, &self.store)
            .drive(&spec, |c| c.show_address(&p))
            .await?;

        let a = expect_ok(&r)?;
        if *a != expected {
            return Err(HarnessError::Assertion(
                "show_address response differs from get_address".to_string(),
            ));
        }

        check_address(a, v)
    }

    async fn sign(
        &self,
        s: &DeviceSession<D>,
        scenario: Scenario,
        tx_hex: &str,
    ) -> Result<(), HarnessError> {
        let p = path(SIGN_PATH)?;
        let payload = tx(tx_hex)?;

        let a = get_address(s, &ADDRESS_0_0_1).await?;
        check_address(&a, &ADDRESS_0_0_1)?;

        let spec = flow(scenario)?;
        let r = ApprovalFlowController::new(s, &self.store)
            .drive(&spec, |c| c.sign(&p, &payload))
            .await?;

        let sig = expect_ok(&r)?;
        check_signature(sig)?;

        verify(&payload, &sig.der, &a.public_key)?;

        info!("Signature verified ({} bytes DER)", sig.der.len());

        Ok(())
    }

    async fn sign_invalid(&self, s: &DeviceSession<D>) -> Result<(), HarnessError> {
        let p = path(SIGN_PATH)?;
        let payload = malformed_tx()?;

        let idle = s.current_screen().await?;

        let r = s
            .client()
            .sign(&p, &payload)?
            .join(s.timeouts().approval())
            .await?;

        expect_status(&r, StatusCode::DATA_INVALID, MALFORMED_MESSAGE)?;

        if s.current_screen().await? != idle {
            return Err(HarnessError::Assertion(
                "screen changed for rejected payload".to_string(),
            ));
        }

        Ok(())
    }

    async fn session_cycles(&self) -> Result<(), HarnessError> {
        let mut first: Option<AddressInfo> = None;

        for i in 0..SESSION_CYCLES {
            info!("Session cycle {i}");

            let mut s = self.start().await?;
            let r = get_address(&s, &ADDRESS_5_0_3).await;
            let t = s.stop().await;

            let a = r?;
            t?;

            check_address(&a, &ADDRESS_5_0_3)?;

            match &first {
                None => first = Some(a),
                Some(f) if *f != a => {
                    return Err(HarnessError::Assertion(format!(
                        "address changed on cycle {i}"
                    )))
                }
                Some(_) => (),
            }
        }

        Ok(())
    }
}

async fn get_address<D: Driver>(
    s: &DeviceSession<D>,
    v: &AddressVector,
) -> Result<AddressInfo, HarnessError> {
    let r = s.client().address(&path(v.path)?).await?;
    expect_ok(&r).cloned()
}

fn flow(scenario: Scenario) -> Result<ApprovalFlowSpec, HarnessError> {
    scenario
        .flow()
        .ok_or_else(|| HarnessError::Assertion(format!("no approval flow for '{scenario}'")))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn scenario_names() {
        assert_eq!(Scenario::SignBasicInvalid.to_string(), "sign_basic_invalid");
        assert_eq!(
            Scenario::from_str("session_cycles").unwrap(),
            Scenario::SessionCycles
        );
        assert_eq!(Scenario::all().len(), 10);
        assert_eq!(Scenario::all()[0], Scenario::StartStop);

        let f = Scenario::SignProposal.flow().unwrap();
        assert_eq!(f.expected_screens, 15);
        assert_eq!(f.pre_actions.len(), 3);
    }
}
