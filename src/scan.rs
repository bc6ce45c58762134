//! Receiver scan loop.
//!
//! Activators and receivers share neither a clock nor a channel plan, so a
//! receiver sweeps every configured channel, listening on each for a little
//! longer than one transmit period, then sleeps. Every valid packet heard is
//! recorded in the [`SharedAggregator`].
//!
//! A receive timeout is the normal outcome on most channels and changes
//! nothing. Radio errors and packets from unknown senders are logged and
//! counted; the loop itself never stops.

use embedded_hal::delay::DelayNs;

use crate::aggregator::SharedAggregator;
use crate::config::ScanConfig;
use crate::fmt::Dbg;
use crate::packet::RadioPacket;
use crate::power::{AlwaysOn, PowerPolicy};
use crate::radio::Transceiver;
use crate::timer::Clock;

/// Sweeps the scan channels and feeds the aggregator.
#[derive(Debug)]
pub struct Scanner<T, P = AlwaysOn> {
    radio: T,
    config: ScanConfig,
    policy: P,
    /// Packets recorded in the aggregator.
    pub rx_good: u32,
    /// Packets received but refused by the aggregator.
    pub rx_rejected: u32,
    /// Radio errors during tuning or receive.
    pub rx_errors: u32,
}

impl<T: Transceiver> Scanner<T> {
    /// A scanner that receives on every pass.
    pub fn new(radio: T, config: ScanConfig) -> Self {
        Self::with_policy(radio, config, AlwaysOn)
    }
}

impl<T: Transceiver, P: PowerPolicy> Scanner<T, P> {
    /// A scanner that asks `policy` before every pass.
    pub fn with_policy(radio: T, config: ScanConfig, policy: P) -> Self {
        Self {
            radio,
            config,
            policy,
            rx_good: 0,
            rx_rejected: 0,
            rx_errors: 0,
        }
    }

    /// Initializes the radio.
    pub fn start(&mut self) -> Result<(), T::Error> {
        self.radio.init()?;
        info!(
            "Scanning {} channels, {} ms each",
            self.config.channels.len(),
            self.config.receive_timeout_ms
        );
        Ok(())
    }

    /// One sweep over the scan channels followed by the pause.
    ///
    /// # Returns
    /// The number of packets recorded during the sweep.
    pub fn pass<C: Clock, D: DelayNs>(
        &mut self,
        aggregator: &SharedAggregator,
        clock: &C,
        delay: &mut D,
    ) -> usize {
        let mut recorded = 0;
        if self.policy.radio_enabled() {
            for i in 0..self.config.channels.len() {
                let channel = self.config.channels[i];
                if self.listen(channel, aggregator, clock) {
                    recorded += 1;
                }
            }
        } else {
            trace!("Radio disabled by power policy");
        }
        delay.delay_ms(self.config.pause_ms);
        recorded
    }

    /// Runs [`pass`](Self::pass) forever.
    pub fn run<C: Clock, D: DelayNs>(
        &mut self,
        aggregator: &SharedAggregator,
        clock: &C,
        delay: &mut D,
    ) -> ! {
        loop {
            let _ = self.pass(aggregator, clock, delay);
        }
    }

    fn listen<C: Clock>(&mut self, channel: u8, aggregator: &SharedAggregator, clock: &C) -> bool {
        if let Err(e) = self.radio.set_channel(channel) {
            self.rx_errors = self.rx_errors.wrapping_add(1);
            warn!("Cannot tune channel {}: {}", channel, Dbg(&e));
            return false;
        }
        let frame = match self.radio.receive(self.config.receive_timeout_ms) {
            Ok(Some(frame)) => frame,
            Ok(None) => return false,
            Err(e) => {
                self.rx_errors = self.rx_errors.wrapping_add(1);
                warn!("Receive failed on channel {}: {}", channel, Dbg(&e));
                return false;
            }
        };
        let packet = RadioPacket::decode(&frame);
        debug!("Channel {}: {}", channel, Dbg(&packet));
        match aggregator.record(&packet, clock.now_ms()) {
            Ok(()) => {
                self.rx_good = self.rx_good.wrapping_add(1);
                true
            }
            Err(_) => {
                self.rx_rejected = self.rx_rejected.wrapping_add(1);
                false
            }
        }
    }

    /// The radio.
    pub fn radio(&self) -> &T {
        &self.radio
    }

    /// The power policy.
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Releases the radio.
    pub fn release(self) -> T {
        self.radio
    }
}
