// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

//! Turns user interactions into rate fetches and fetch outcomes into
//! rendered results.
//!
//! The controller never awaits. Every trigger returns a [`PendingFetch`]
//! that the caller drives (usually inside a `FuturesUnordered`) and hands
//! back through [`Controller::complete`]. Each fetch carries a sequence
//! number, and only the most recently dispatched one may touch the display.

use crate::api::RateFetcher;
use crate::error::{ConvertError, ErrorKind};
use crate::models::{
    normalize_amount, present, ConversionRequest, ConversionResult, CurrencyEntry, Flag, RateTable,
};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::Arc;

/// What the user did.
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    AmountChanged(String),
    FromChanged(&'static CurrencyEntry),
    ToChanged(&'static CurrencyEntry),
    Swap,
    Submit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    From,
    To,
}

/// Rendering hooks the controller drives.
pub trait Surface {
    fn render_loading(&mut self);
    fn render(&mut self, result: &ConversionResult);
    fn render_error(&mut self, error: &ConvertError);
    fn update_flag(&mut self, side: Side, flag: &Flag);
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConverterState {
    Idle,
    Loading { seq: u64 },
    Displayed(ConversionResult),
    Failed(ErrorKind),
}

/// Current currencies and amount.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub from: &'static CurrencyEntry,
    pub to: &'static CurrencyEntry,
    /// Text shown in the amount input.
    pub amount_input: String,
    pub amount: f64,
}

impl Selection {
    pub fn new(from: &'static CurrencyEntry, to: &'static CurrencyEntry, amount_input: &str) -> Self {
        let normalized = normalize_amount(amount_input);
        Self {
            from,
            to,
            amount_input: normalized.display,
            amount: normalized.value,
        }
    }

    pub fn set_amount(&mut self, input: &str) {
        let normalized = normalize_amount(input);
        self.amount_input = normalized.display;
        self.amount = normalized.value;
    }

    pub fn swap(&mut self) {
        std::mem::swap(&mut self.from, &mut self.to);
    }

    pub fn request(&self) -> ConversionRequest {
        ConversionRequest {
            amount: self.amount,
            from: self.from.code,
            to: self.to.code,
        }
    }
}

/// A finished fetch, tagged with the trigger it belongs to.
#[derive(Debug)]
pub struct Completion {
    pub seq: u64,
    pub request: ConversionRequest,
    pub outcome: Result<RateTable, ConvertError>,
}

pub type PendingFetch = BoxFuture<'static, Completion>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Displayed,
    Failed,
    /// A newer fetch was dispatched after this one; the display is untouched.
    Stale,
}

pub struct Controller {
    fetcher: Arc<dyn RateFetcher>,
    flag_provider: String,
    selection: Selection,
    state: ConverterState,
    last_dispatched: u64,
    last_rates: Option<RateTable>,
}

impl Controller {
    pub fn new(fetcher: Arc<dyn RateFetcher>, selection: Selection, flag_provider: &str) -> Self {
        Self {
            fetcher,
            flag_provider: flag_provider.to_string(),
            selection,
            state: ConverterState::Idle,
            last_dispatched: 0,
            last_rates: None,
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    #[cfg(test)]
    pub fn state(&self) -> &ConverterState {
        &self.state
    }

    /// Rate table behind the result currently on display.
    pub fn last_rates(&self) -> Option<&RateTable> {
        self.last_rates.as_ref()
    }

    pub fn flag(&self, side: Side) -> Flag {
        let entry = match side {
            Side::From => self.selection.from,
            Side::To => self.selection.to,
        };
        Flag::for_currency(entry, &self.flag_provider)
    }

    /// Paint both flags and run the first conversion.
    pub fn start(&mut self, surface: &mut dyn Surface) -> PendingFetch {
        self.refresh_flag(Side::From, surface);
        self.refresh_flag(Side::To, surface);
        self.dispatch(surface)
    }

    pub fn handle(&mut self, trigger: Trigger, surface: &mut dyn Surface) -> PendingFetch {
        match trigger {
            Trigger::AmountChanged(input) => self.selection.set_amount(&input),
            Trigger::FromChanged(entry) => {
                self.selection.from = entry;
                self.refresh_flag(Side::From, surface);
            }
            Trigger::ToChanged(entry) => {
                self.selection.to = entry;
                self.refresh_flag(Side::To, surface);
            }
            Trigger::Swap => {
                self.selection.swap();
                self.refresh_flag(Side::From, surface);
                self.refresh_flag(Side::To, surface);
            }
            Trigger::Submit => {}
        }
        self.dispatch(surface)
    }

    /// Apply a finished fetch, unless a newer one has been dispatched since.
    pub fn complete(&mut self, completion: Completion, surface: &mut dyn Surface) -> Applied {
        if completion.seq != self.last_dispatched {
            tracing::debug!(
                seq = completion.seq,
                latest = self.last_dispatched,
                "dropping superseded rate response"
            );
            return Applied::Stale;
        }

        let result = completion
            .outcome
            .and_then(|table| present(&completion.request, &table).map(|result| (table, result)));

        match result {
            Ok((table, result)) => {
                surface.render(&result);
                self.last_rates = Some(table);
                self.state = ConverterState::Displayed(result);
                Applied::Displayed
            }
            Err(err) => {
                tracing::warn!(
                    seq = completion.seq,
                    kind = ?err.kind(),
                    error = %err,
                    "Error fetching exchange rate"
                );
                surface.render_error(&err);
                self.state = ConverterState::Failed(err.kind());
                Applied::Failed
            }
        }
    }

    fn refresh_flag(&self, side: Side, surface: &mut dyn Surface) {
        surface.update_flag(side, &self.flag(side));
    }

    fn dispatch(&mut self, surface: &mut dyn Surface) -> PendingFetch {
        self.last_dispatched += 1;
        let seq = self.last_dispatched;
        self.state = ConverterState::Loading { seq };
        surface.render_loading();

        let request = self.selection.request();
        let fetcher = Arc::clone(&self.fetcher);
        tracing::debug!(seq, base = request.from, target = request.to, "dispatching rate fetch");

        async move {
            let outcome = fetcher.fetch_rates(request.from).await;
            Completion { seq, request, outcome }
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockRateFetcher;
    use crate::models::lookup;
    use futures::stream::{FuturesUnordered, StreamExt};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl Surface for Recorder {
        fn render_loading(&mut self) {
            self.events.push("loading".to_string());
        }

        fn render(&mut self, result: &ConversionResult) {
            self.events.push(result.amount_line());
            self.events.push(result.rate_line());
        }

        fn render_error(&mut self, _error: &ConvertError) {
            self.events.push(ConvertError::USER_MESSAGE.to_string());
        }

        fn update_flag(&mut self, side: Side, flag: &Flag) {
            self.events.push(format!("{:?} {} {}", side, flag.alt, flag.url));
        }
    }

    fn entry(code: &str) -> &'static CurrencyEntry {
        lookup(code).unwrap()
    }

    fn usd_inr(amount: &str) -> Selection {
        Selection::new(entry("USD"), entry("INR"), amount)
    }

    fn table(base: &str, pairs: &[(&str, f64)]) -> RateTable {
        RateTable::new(base, pairs.iter().map(|(c, r)| (c.to_string(), *r)).collect())
    }

    fn controller_with(mock: MockRateFetcher, selection: Selection) -> Controller {
        Controller::new(Arc::new(mock), selection, "flagsapi.com")
    }

    #[tokio::test]
    async fn test_start_renders_flags_then_result() {
        let mut mock = MockRateFetcher::new();
        mock.expect_fetch_rates()
            .withf(|base| base == "USD")
            .times(1)
            .returning(|_| Ok(table("USD", &[("INR", 83.12)])));

        let mut controller = controller_with(mock, usd_inr("10"));
        let mut surface = Recorder::default();
        assert_eq!(controller.state(), &ConverterState::Idle);

        let pending = controller.start(&mut surface);
        assert_eq!(controller.state(), &ConverterState::Loading { seq: 1 });

        let completion = pending.await;
        assert_eq!(controller.complete(completion, &mut surface), Applied::Displayed);

        assert_eq!(
            surface.events,
            vec![
                "From USD flag https://flagsapi.com/US/flat/64.png",
                "To INR flag https://flagsapi.com/IN/flat/64.png",
                "loading",
                "10 USD = 831.2 INR",
                "1 USD = 83.120000 INR",
            ]
        );
        match controller.state() {
            ConverterState::Displayed(result) => {
                assert_eq!(result.converted_amount, 831.2);
                assert_eq!(result.unit_rate, 83.12);
            }
            other => panic!("unexpected state {:?}", other),
        }
        assert_eq!(controller.last_rates().map(|t| t.base.as_str()), Some("USD"));
    }

    #[tokio::test]
    async fn test_network_failure_then_recovery() {
        let mut mock = MockRateFetcher::new();
        let mut calls = 0;
        mock.expect_fetch_rates().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Err(ConvertError::Network("connection refused".to_string()))
            } else {
                Ok(table("USD", &[("INR", 80.0)]))
            }
        });

        let mut controller = controller_with(mock, usd_inr("2"));
        let mut surface = Recorder::default();

        let pending = controller.handle(Trigger::Submit, &mut surface);
        assert_eq!(controller.complete(pending.await, &mut surface), Applied::Failed);
        assert_eq!(controller.state(), &ConverterState::Failed(ErrorKind::Network));
        assert_eq!(surface.events.last().unwrap(), ConvertError::USER_MESSAGE);

        // Still interactive: the next trigger goes through
        let pending = controller.handle(Trigger::Submit, &mut surface);
        assert_eq!(controller.state(), &ConverterState::Loading { seq: 2 });
        assert_eq!(controller.complete(pending.await, &mut surface), Applied::Displayed);
        assert_eq!(surface.events.last().unwrap(), "1 USD = 80.000000 INR");
    }

    #[tokio::test]
    async fn test_missing_target_rate_fails() {
        let mut mock = MockRateFetcher::new();
        mock.expect_fetch_rates()
            .returning(|_| Ok(table("USD", &[("EUR", 0.92)])));

        let mut controller = controller_with(mock, usd_inr("1"));
        let mut surface = Recorder::default();

        let pending = controller.handle(Trigger::Submit, &mut surface);
        assert_eq!(controller.complete(pending.await, &mut surface), Applied::Failed);
        assert_eq!(controller.state(), &ConverterState::Failed(ErrorKind::MissingRate));
        assert_eq!(surface.events, vec!["loading", ConvertError::USER_MESSAGE]);
        assert!(controller.last_rates().is_none());
    }

    #[tokio::test]
    async fn test_swap_is_involutive_and_fetches_new_base() {
        let mut mock = MockRateFetcher::new();
        mock.expect_fetch_rates()
            .withf(|base| base == "INR")
            .times(1)
            .returning(|_| Ok(table("INR", &[("USD", 0.012)])));
        mock.expect_fetch_rates()
            .withf(|base| base == "USD")
            .times(1)
            .returning(|_| Ok(table("USD", &[("INR", 83.12)])));

        let mut controller = controller_with(mock, usd_inr("100"));
        let original = controller.selection().clone();
        let mut surface = Recorder::default();

        let pending = controller.handle(Trigger::Swap, &mut surface);
        assert_eq!(controller.selection().from.code, "INR");
        assert_eq!(controller.selection().to.code, "USD");
        assert_eq!(
            &surface.events[..2],
            &[
                "From INR flag https://flagsapi.com/IN/flat/64.png".to_string(),
                "To USD flag https://flagsapi.com/US/flat/64.png".to_string(),
            ]
        );
        controller.complete(pending.await, &mut surface);
        assert_eq!(surface.events.last().unwrap(), "1 INR = 0.012000 USD");

        let pending = controller.handle(Trigger::Swap, &mut surface);
        assert_eq!(controller.selection(), &original);
        controller.complete(pending.await, &mut surface);
    }

    #[tokio::test]
    async fn test_negative_amount_is_normalized() {
        let mut mock = MockRateFetcher::new();
        mock.expect_fetch_rates()
            .returning(|_| Ok(table("USD", &[("INR", 83.12)])));

        let mut controller = controller_with(mock, usd_inr("10"));
        let mut surface = Recorder::default();

        let pending = controller.handle(Trigger::AmountChanged("-5".to_string()), &mut surface);
        assert_eq!(controller.selection().amount, 1.0);
        assert_eq!(controller.selection().amount_input, "1");

        let completion = pending.await;
        assert_eq!(completion.request.amount, 1.0);
        controller.complete(completion, &mut surface);
        assert_eq!(surface.events.last().unwrap(), "1 USD = 83.120000 INR");
        assert_eq!(surface.events[surface.events.len() - 2], "1 USD = 83.12 INR");
    }

    #[tokio::test]
    async fn test_currency_change_updates_one_flag() {
        let mut mock = MockRateFetcher::new();
        mock.expect_fetch_rates()
            .withf(|base| base == "GBP")
            .returning(|_| Ok(table("GBP", &[("INR", 105.0)])));

        let mut controller = controller_with(mock, usd_inr("1"));
        let mut surface = Recorder::default();

        let pending = controller.handle(Trigger::FromChanged(entry("GBP")), &mut surface);
        assert_eq!(
            surface.events,
            vec!["From GBP flag https://flagsapi.com/GB/flat/64.png", "loading"]
        );
        controller.complete(pending.await, &mut surface);
        assert_eq!(surface.events.last().unwrap(), "1 GBP = 105.000000 INR");
    }

    /// Fetcher whose responses are released by the test, per base currency.
    struct ReleasedFetcher {
        pending: Mutex<HashMap<String, oneshot::Receiver<Result<RateTable, ConvertError>>>>,
    }

    #[async_trait::async_trait]
    impl RateFetcher for ReleasedFetcher {
        async fn fetch_rates(&self, base: &str) -> Result<RateTable, ConvertError> {
            let receiver = self.pending.lock().unwrap().remove(base);
            match receiver {
                Some(receiver) => receiver
                    .await
                    .unwrap_or_else(|_| Err(ConvertError::Network("released without response".into()))),
                None => Err(ConvertError::Network(format!("unexpected base {}", base))),
            }
        }
    }

    #[allow(clippy::type_complexity)]
    fn released_fetcher(
        bases: &[&str],
    ) -> (Arc<ReleasedFetcher>, HashMap<String, oneshot::Sender<Result<RateTable, ConvertError>>>) {
        let mut receivers = HashMap::new();
        let mut senders = HashMap::new();
        for base in bases {
            let (tx, rx) = oneshot::channel();
            receivers.insert(base.to_string(), rx);
            senders.insert(base.to_string(), tx);
        }
        let fetcher = Arc::new(ReleasedFetcher {
            pending: Mutex::new(receivers),
        });
        (fetcher, senders)
    }

    #[tokio::test]
    async fn test_late_response_from_older_trigger_is_dropped() {
        let (fetcher, mut senders) = released_fetcher(&["EUR", "GBP"]);
        let mut controller = Controller::new(fetcher, usd_inr("10"), "flagsapi.com");
        let mut surface = Recorder::default();
        let mut in_flight = FuturesUnordered::new();

        in_flight.push(controller.handle(Trigger::FromChanged(entry("EUR")), &mut surface));
        in_flight.push(controller.handle(Trigger::FromChanged(entry("GBP")), &mut surface));

        // The second request resolves first
        senders
            .remove("GBP")
            .unwrap()
            .send(Ok(table("GBP", &[("INR", 105.0)])))
            .unwrap();
        let completion = in_flight.next().await.unwrap();
        assert_eq!(completion.seq, 2);
        assert_eq!(controller.complete(completion, &mut surface), Applied::Displayed);

        senders
            .remove("EUR")
            .unwrap()
            .send(Ok(table("EUR", &[("INR", 90.0)])))
            .unwrap();
        let completion = in_flight.next().await.unwrap();
        assert_eq!(completion.seq, 1);
        assert_eq!(controller.complete(completion, &mut surface), Applied::Stale);

        assert_eq!(surface.events.last().unwrap(), "1 GBP = 105.000000 INR");
        match controller.state() {
            ConverterState::Displayed(result) => assert_eq!(result.from, "GBP"),
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_early_response_from_older_trigger_is_dropped() {
        let (fetcher, mut senders) = released_fetcher(&["EUR", "GBP"]);
        let mut controller = Controller::new(fetcher, usd_inr("10"), "flagsapi.com");
        let mut surface = Recorder::default();
        let mut in_flight = FuturesUnordered::new();

        in_flight.push(controller.handle(Trigger::FromChanged(entry("EUR")), &mut surface));
        in_flight.push(controller.handle(Trigger::FromChanged(entry("GBP")), &mut surface));

        senders
            .remove("EUR")
            .unwrap()
            .send(Ok(table("EUR", &[("INR", 90.0)])))
            .unwrap();
        let completion = in_flight.next().await.unwrap();
        assert_eq!(controller.complete(completion, &mut surface), Applied::Stale);
        assert_eq!(controller.state(), &ConverterState::Loading { seq: 2 });
        assert_eq!(surface.events.last().unwrap(), "loading");

        senders
            .remove("GBP")
            .unwrap()
            .send(Err(ConvertError::InvalidResponse("missing `rates`".into())))
            .unwrap();
        let completion = in_flight.next().await.unwrap();
        assert_eq!(controller.complete(completion, &mut surface), Applied::Failed);
        assert_eq!(controller.state(), &ConverterState::Failed(ErrorKind::InvalidResponse));
    }
}
