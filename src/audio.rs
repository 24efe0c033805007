//! Web Audio sound output
//!
//! Every effect is synthesised from oscillators, so there are no sound files
//! to fetch before the session starts.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::platform::{SoundEvent, SoundSink};
use crate::settings::Settings;

/// Oscillator-backed [`SoundSink`]
pub struct WebAudioSink {
    ctx: Option<AudioContext>,
    settings: Settings,
}

impl WebAudioSink {
    pub fn new(settings: &Settings) -> Self {
        // Fails outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!(target: "sound", "Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            settings: settings.clone(),
        }
    }

    fn osc(
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Laser zap
    fn shoot(ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = Self::osc(ctx, 880.0, OscillatorType::Square) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.15, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.08)
            .ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(220.0, t + 0.08)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.1).ok();
    }

    /// Low boom with a short crack on top
    fn explosion(ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();

        if let Some((osc, gain)) = Self::osc(ctx, 120.0, OscillatorType::Sawtooth) {
            gain.gain().set_value_at_time(vol * 0.45, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.35)
                .ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(35.0, t + 0.35)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.4).ok();
        }

        if let Some((osc, gain)) = Self::osc(ctx, 1800.0, OscillatorType::Square) {
            gain.gain().set_value_at_time(vol * 0.15, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.06)
                .ok();
            osc.frequency().set_value_at_time(900.0, t + 0.02).ok();
            osc.frequency().set_value_at_time(2400.0, t + 0.04).ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.08).ok();
        }
    }

    /// Rising arpeggio
    fn power_up(ctx: &AudioContext, vol: f32) {
        for (i, freq) in [523.0, 659.0, 784.0, 1047.0].iter().enumerate() {
            let Some((osc, gain)) = Self::osc(ctx, *freq, OscillatorType::Triangle) else {
                continue;
            };
            let t = ctx.current_time() + i as f64 * 0.06;
            gain.gain().set_value_at_time(vol * 0.25, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.12)
                .ok();
            osc.start_with_when(t).ok();
            osc.stop_with_when(t + 0.15).ok();
        }
    }

    /// Slow descending tones
    fn game_over(ctx: &AudioContext, vol: f32) {
        for (i, freq) in [392.0, 330.0, 262.0, 196.0].iter().enumerate() {
            let Some((osc, gain)) = Self::osc(ctx, *freq, OscillatorType::Sine) else {
                continue;
            };
            let t = ctx.current_time() + i as f64 * 0.25;
            gain.gain().set_value_at_time(vol * 0.3, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.35)
                .ok();
            osc.start_with_when(t).ok();
            osc.stop_with_when(t + 0.45).ok();
        }
    }
}

impl SoundSink for WebAudioSink {
    fn play(&mut self, sound: SoundEvent) {
        let vol = self.settings.effective_volume();
        if vol <= 0.0 {
            return;
        }
        let Some(ctx) = &self.ctx else { return };

        // Browsers suspend the context until a user gesture
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        log::trace!(target: "sound", "play {}", sound.as_str());
        match sound {
            SoundEvent::Shoot => Self::shoot(ctx, vol),
            SoundEvent::Explosion => Self::explosion(ctx, vol),
            SoundEvent::PowerUp => Self::power_up(ctx, vol),
            SoundEvent::GameOver => Self::game_over(ctx, vol),
        }
    }

    fn toggle_mute(&mut self) -> bool {
        let muted = !self.settings.muted;
        self.settings.muted = muted;
        log::debug!(target: "sound", "{}", if muted { "mute" } else { "unmute" });
        muted
    }
}
