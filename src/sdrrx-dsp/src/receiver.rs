// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Receiver: assembles the NCO, decimator, channel filter, AGC, demodulator
//! and resampler into the per-channel chain, grounded on the overall shape
//! of `dsp/channel.rs`'s `ChannelDsp` (mixer → filter → decimate → demod →
//! frame buffering) even though individual stages here are this crate's
//! own modules rather than `ChannelDsp`'s inline versions.

use num_complex::Complex;
use sdrrx_core::{AgcParams, ChannelFilterParams, DemodKind, SdrResult};

use crate::agc::Agc;
use crate::decimator::DecimatorChain;
use crate::demod::Demodulator;
use crate::nco::Nco;
use crate::resampler::FractResampler;
use crate::smeter::SMeter;

/// Outcome of one [`Receiver::process`] call. A squelched block is a
/// dedicated variant rather than folded into the error channel, so a
/// closed squelch reads as "no audio this block" rather than a failure.
pub enum AudioFrame {
    Samples(usize),
    Squelched,
}

pub struct Receiver {
    nco: Nco,
    decimator: Option<DecimatorChain>,
    channel_filter: crate::channel_filter::ChannelFilter,
    agc: Agc,
    smeter: SMeter,
    demod_kind: DemodKind,
    demod: Demodulator,
    resampler: FractResampler,
    quad_rate: f64,
    output_rate: f64,
    resample_ratio: f64,
}

fn next_pow2(x: u32) -> u32 {
    if x <= 1 {
        1
    } else {
        x.next_power_of_two()
    }
}

impl Receiver {
    pub fn init(
        input_rate: u32,
        output_rate: u32,
        dynamic_range_db: u32,
        demod_kind: DemodKind,
        channel: ChannelFilterParams,
        agc_params: AgcParams,
        squelch_db: f64,
    ) -> SdrResult<Self> {
        let quad_decim = next_pow2((input_rate / (2 * output_rate.max(1))).max(1));

        let decimator = if quad_decim > 1 {
            Some(DecimatorChain::new(quad_decim, dynamic_range_db)?)
        } else {
            None
        };
        let actual_decim = decimator.as_ref().map(|d| d.decimation()).unwrap_or(1);
        let quad_rate = input_rate as f64 / actual_decim as f64;

        let mut channel = channel;
        channel.sample_rate = quad_rate;
        let channel_filter = crate::channel_filter::ChannelFilter::new(channel)?;

        let mut agc_params = agc_params;
        agc_params.sample_rate = quad_rate;

        let bandwidth = (channel.high_cut - channel.low_cut).abs().max(1.0);
        let demod = Demodulator::for_kind(demod_kind, quad_rate, bandwidth);

        Ok(Self {
            nco: Nco::new(input_rate as f64),
            decimator,
            channel_filter,
            agc: Agc::new(agc_params),
            smeter: SMeter::new(squelch_db),
            demod_kind,
            demod,
            resampler: FractResampler::new(),
            quad_rate,
            output_rate: output_rate as f64,
            resample_ratio: quad_rate / output_rate as f64,
        })
    }

    pub fn set_tuning_offset(&mut self, hz: f64) {
        self.nco.set_frequency(hz);
    }

    pub fn quad_rate(&self) -> f64 {
        self.quad_rate
    }

    /// Hot-applies new channel cutoffs/CW offset at the receiver's own
    /// `quad_rate`, without tearing down the pipeline thread.
    pub fn reconfigure_channel(&mut self, mut params: ChannelFilterParams) -> SdrResult<()> {
        params.sample_rate = self.quad_rate;
        self.channel_filter.reconfigure(params)
    }

    /// Hot-applies new AGC parameters at the receiver's own `quad_rate`.
    pub fn reconfigure_agc(&mut self, mut params: AgcParams) {
        params.sample_rate = self.quad_rate;
        self.agc.reconfigure(params);
    }

    /// Hot-swaps the demodulator, rebuilt at this receiver's `quad_rate` and
    /// the channel filter's current bandwidth.
    pub fn set_demod_kind(&mut self, kind: DemodKind) {
        let bandwidth = (self.channel_filter.params().high_cut
            - self.channel_filter.params().low_cut)
            .abs()
            .max(1.0);
        self.demod = Demodulator::for_kind(kind, self.quad_rate, bandwidth);
        self.demod_kind = kind;
    }

    pub fn set_squelch(&mut self, squelch_db: f64) {
        self.smeter.set_squelch(squelch_db);
    }

    /// Runs one block through NCO → decimate → channel filter → squelch →
    /// demod → resample, writing audio into `audio_out` (cleared first) as
    /// `i16` PCM.
    pub fn process(
        &mut self,
        input: &mut [Complex<f32>],
        audio_out: &mut Vec<i16>,
    ) -> AudioFrame {
        audio_out.clear();

        self.nco.mix(input);

        let decimated = match &mut self.decimator {
            Some(d) => d.process(input),
            None => input.to_vec(),
        };

        let filtered = self.channel_filter.process(&decimated);
        if filtered.is_empty() {
            return AudioFrame::Samples(0);
        }

        if !self.smeter.measure(&filtered) {
            return AudioFrame::Squelched;
        }

        let real: Vec<f32> = match self.demod_kind {
            DemodKind::Ssb | DemodKind::Am => {
                let mut agc_out = Vec::new();
                self.agc.process(&filtered, &mut agc_out);
                self.demod.demodulate(&agc_out)
            }
            DemodKind::Fm | DemodKind::Apt | DemodKind::None => self.demod.demodulate(&filtered),
        };

        let mut resampled = Vec::new();
        self.resampler
            .resample(&real, self.resample_ratio, &mut resampled);

        for s in resampled {
            audio_out.push((s.clamp(-1.0, 1.0) * 32767.0) as i16);
        }

        AudioFrame::Samples(audio_out.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_channel() -> ChannelFilterParams {
        ChannelFilterParams {
            low_cut: -3000.0,
            high_cut: 3000.0,
            cw_offset: 0.0,
            sample_rate: 48_000.0,
        }
    }

    fn default_agc() -> AgcParams {
        AgcParams {
            on: true,
            use_hang: false,
            threshold_db: -100.0,
            manual_gain_db: 0.0,
            slope_db: 0.0,
            decay_ms: 500.0,
            sample_rate: 48_000.0,
        }
    }

    #[test]
    fn squelched_block_reports_squelched_variant() {
        let mut rx = Receiver::init(
            192_000,
            48_000,
            70,
            DemodKind::Am,
            default_channel(),
            default_agc(),
            -20.0,
        )
        .unwrap();
        let mut input = vec![Complex::new(0.0, 0.0); 8192];
        let mut audio = Vec::new();
        match rx.process(&mut input, &mut audio) {
            AudioFrame::Squelched => {}
            AudioFrame::Samples(n) => panic!("expected squelch, got {n} samples"),
        }
    }

    #[test]
    fn strong_signal_produces_audio_samples() {
        let mut rx = Receiver::init(
            192_000,
            48_000,
            70,
            DemodKind::Am,
            default_channel(),
            default_agc(),
            -100.0,
        )
        .unwrap();
        let mut input: Vec<Complex<f32>> = (0..16384)
            .map(|i| {
                let theta = 2.0 * std::f64::consts::PI * 500.0 * i as f64 / 192_000.0;
                Complex::new(theta.cos() as f32, theta.sin() as f32)
            })
            .collect();
        let mut audio = Vec::new();
        match rx.process(&mut input, &mut audio) {
            AudioFrame::Samples(n) => assert!(n > 0),
            AudioFrame::Squelched => panic!("expected audio, got squelch"),
        }
    }

    #[test]
    fn quad_decim_is_a_power_of_two() {
        let rx = Receiver::init(
            2_048_000,
            48_000,
            100,
            DemodKind::Fm,
            default_channel(),
            default_agc(),
            -100.0,
        )
        .unwrap();
        assert!((2_048_000.0 / rx.quad_rate()).log2().fract().abs() < 1e-9);
    }

    #[test]
    fn hot_reconfigure_channel_accepts_new_cutoffs() {
        let mut rx = Receiver::init(
            192_000,
            48_000,
            70,
            DemodKind::Am,
            default_channel(),
            default_agc(),
            -100.0,
        )
        .unwrap();
        let mut narrower = default_channel();
        narrower.low_cut = -1500.0;
        narrower.high_cut = 1500.0;
        assert!(rx.reconfigure_channel(narrower).is_ok());
    }

    #[test]
    fn set_demod_kind_switches_the_active_demodulator() {
        let mut rx = Receiver::init(
            192_000,
            48_000,
            70,
            DemodKind::Am,
            default_channel(),
            default_agc(),
            -100.0,
        )
        .unwrap();
        rx.set_demod_kind(DemodKind::Fm);
        assert!(matches!(rx.demod, Demodulator::Fm(_)));
    }
}
