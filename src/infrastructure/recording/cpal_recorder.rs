//! Cross-platform audio recorder using cpal
//!
//! Speech-optimized capture settings:
//! - 16kHz sample rate (or resampling from the device rate)
//! - Mono channel
//! - FLAC or WAV container via separate encoders

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Instant;

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, StreamConfig};
use rubato::{FftFixedIn, Resampler};
use tokio::time::{interval, Duration as TokioDuration};

use super::{flac_encoder, wav_encoder};
use crate::application::ports::{AudioRecorder, ProgressCallback, RecordingError};
use crate::domain::audio::{AudioCodec, AudioData, TARGET_SAMPLE_RATE};
use crate::domain::memo::Duration;

/// Fixed-duration recorder using cpal
///
/// The stream is managed inside a blocking task because cpal::Stream
/// is not Send.
pub struct CpalRecorder {
    /// Recorded audio samples (mono, i16, at device sample rate)
    audio_buffer: Arc<StdMutex<Vec<i16>>>,
    /// Recording state
    is_recording: Arc<AtomicBool>,
    /// Output container
    codec: AudioCodec,
}

impl CpalRecorder {
    pub fn new(codec: AudioCodec) -> Self {
        Self {
            audio_buffer: Arc::new(StdMutex::new(Vec::new())),
            is_recording: Arc::new(AtomicBool::new(false)),
            codec,
        }
    }

    /// Get the default input device
    fn get_input_device() -> Result<cpal::Device, RecordingError> {
        let host = cpal::default_host();
        host.default_input_device()
            .ok_or(RecordingError::NoAudioDevice)
    }

    /// Get a suitable input configuration
    fn get_input_config(
        device: &cpal::Device,
    ) -> Result<(StreamConfig, SampleFormat), RecordingError> {
        let supported_configs = device
            .supported_input_configs()
            .map_err(|e| RecordingError::StartFailed(format!("Failed to get configs: {}", e)))?;

        // Prefer mono at 16kHz, accept stereo (mixed down later)
        let mut best_config: Option<cpal::SupportedStreamConfigRange> = None;

        for config in supported_configs {
            // Only consider i16 or f32 formats
            if config.sample_format() != SampleFormat::I16
                && config.sample_format() != SampleFormat::F32
            {
                continue;
            }

            let includes_target = config.min_sample_rate().0 <= TARGET_SAMPLE_RATE
                && config.max_sample_rate().0 >= TARGET_SAMPLE_RATE;

            let is_better = match &best_config {
                None => true,
                Some(current) => {
                    let fewer_channels = config.channels() < current.channels();
                    let better_rate =
                        includes_target && current.min_sample_rate().0 > TARGET_SAMPLE_RATE;
                    fewer_channels || better_rate
                }
            };
            if is_better {
                best_config = Some(config);
            }
        }

        let config_range = best_config.ok_or(RecordingError::StartFailed(
            "No suitable config found".into(),
        ))?;

        // Use the target rate when the device supports it
        let sample_rate = if config_range.min_sample_rate().0 <= TARGET_SAMPLE_RATE
            && config_range.max_sample_rate().0 >= TARGET_SAMPLE_RATE
        {
            SampleRate(TARGET_SAMPLE_RATE)
        } else {
            config_range.min_sample_rate()
        };

        let sample_format = config_range.sample_format();
        let config = StreamConfig {
            channels: config_range.channels(),
            sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };

        Ok((config, sample_format))
    }

    /// Resample audio from device rate to 16kHz if needed
    fn resample_to_16k(samples: &[i16], source_rate: u32) -> Result<Vec<i16>, RecordingError> {
        if source_rate == TARGET_SAMPLE_RATE {
            return Ok(samples.to_vec());
        }

        let samples_f32: Vec<f32> = samples.iter().map(|&s| s as f32 / 32768.0).collect();

        let ratio = TARGET_SAMPLE_RATE as f64 / source_rate as f64;
        let output_len = (samples_f32.len() as f64 * ratio).ceil() as usize;

        let mut resampler = FftFixedIn::<f32>::new(
            source_rate as usize,
            TARGET_SAMPLE_RATE as usize,
            1024, // Chunk size
            2,    // Sub-chunks
            1,    // Mono
        )
        .map_err(|e| RecordingError::RecordingFailed(format!("Resampler init failed: {}", e)))?;

        let mut output = Vec::with_capacity(output_len);
        let mut input_pos = 0;

        while input_pos < samples_f32.len() {
            let frames_needed = resampler.input_frames_next();
            let end_pos = (input_pos + frames_needed).min(samples_f32.len());
            let chunk: Vec<Vec<f32>> = vec![samples_f32[input_pos..end_pos].to_vec()];

            // Pad the tail chunk if short
            let chunk = if chunk[0].len() < frames_needed {
                let mut padded = chunk[0].clone();
                padded.resize(frames_needed, 0.0);
                vec![padded]
            } else {
                chunk
            };

            let resampled = resampler.process(&chunk, None).map_err(|e| {
                RecordingError::RecordingFailed(format!("Resampling failed: {}", e))
            })?;

            output.extend(resampled[0].iter().map(|&s| (s * 32767.0) as i16));
            input_pos = end_pos;
        }

        output.truncate(output_len);

        Ok(output)
    }

    /// Mix stereo to mono
    fn stereo_to_mono(samples: &[i16], channels: u16) -> Vec<i16> {
        if channels == 1 {
            return samples.to_vec();
        }

        samples
            .chunks(channels as usize)
            .map(|chunk| {
                let sum: i32 = chunk.iter().map(|&s| s as i32).sum();
                (sum / channels as i32) as i16
            })
            .collect()
    }

    /// Resample and encode PCM samples into the chosen container
    fn encode_audio(
        samples: &[i16],
        sample_rate: u32,
        codec: AudioCodec,
    ) -> Result<AudioData, RecordingError> {
        let resampled = Self::resample_to_16k(samples, sample_rate)?;

        let encoded = match codec {
            AudioCodec::Flac => flac_encoder::encode_to_flac(&resampled)
                .map_err(|e| RecordingError::RecordingFailed(e.to_string()))?,
            AudioCodec::Wav => wav_encoder::encode_to_wav(&resampled)
                .map_err(|e| RecordingError::RecordingFailed(e.to_string()))?,
        };

        if encoded.is_empty() {
            return Err(RecordingError::ReadFailed("Encoded audio is empty".into()));
        }

        Ok(AudioData::new(encoded, codec))
    }
}

impl Default for CpalRecorder {
    fn default() -> Self {
        Self::new(AudioCodec::default())
    }
}

#[async_trait]
impl AudioRecorder for CpalRecorder {
    async fn record(
        &self,
        duration: Duration,
        on_progress: Option<ProgressCallback>,
    ) -> Result<AudioData, RecordingError> {
        let duration_ms = duration.as_millis();

        {
            let mut buffer = self
                .audio_buffer
                .lock()
                .map_err(|_| RecordingError::StartFailed("Buffer lock poisoned".into()))?;
            buffer.clear();
        }

        self.is_recording.store(true, Ordering::SeqCst);

        let audio_buffer = Arc::clone(&self.audio_buffer);
        let is_recording = Arc::clone(&self.is_recording);

        // cpal::Stream is not Send, so the whole capture runs blocking
        let record_handle = tokio::task::spawn_blocking(move || {
            let device = CpalRecorder::get_input_device()?;
            let (config, sample_format) = CpalRecorder::get_input_config(&device)?;
            let sample_rate = config.sample_rate.0;
            let channels = config.channels;

            let audio_buffer_clone = Arc::clone(&audio_buffer);
            let is_recording_clone = Arc::clone(&is_recording);

            let stream = match sample_format {
                SampleFormat::I16 => device
                    .build_input_stream(
                        &config,
                        move |data: &[i16], _: &cpal::InputCallbackInfo| {
                            if is_recording_clone.load(Ordering::SeqCst) {
                                let mono = CpalRecorder::stereo_to_mono(data, channels);
                                if let Ok(mut buffer) = audio_buffer_clone.lock() {
                                    buffer.extend_from_slice(&mono);
                                }
                            }
                        },
                        |err| tracing::error!(error = %err, "audio stream error"),
                        None,
                    )
                    .map_err(|e| RecordingError::StartFailed(e.to_string()))?,

                SampleFormat::F32 => {
                    let audio_buffer_clone = Arc::clone(&audio_buffer);
                    let is_recording_clone = Arc::clone(&is_recording);

                    device
                        .build_input_stream(
                            &config,
                            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                                if is_recording_clone.load(Ordering::SeqCst) {
                                    let i16_data: Vec<i16> =
                                        data.iter().map(|&s| (s * 32767.0) as i16).collect();
                                    let mono = CpalRecorder::stereo_to_mono(&i16_data, channels);
                                    if let Ok(mut buffer) = audio_buffer_clone.lock() {
                                        buffer.extend_from_slice(&mono);
                                    }
                                }
                            },
                            |err| tracing::error!(error = %err, "audio stream error"),
                            None,
                        )
                        .map_err(|e| RecordingError::StartFailed(e.to_string()))?
                }

                _ => {
                    return Err(RecordingError::StartFailed(
                        "Unsupported sample format".into(),
                    ))
                }
            };

            stream
                .play()
                .map_err(|e| RecordingError::StartFailed(e.to_string()))?;

            std::thread::sleep(std::time::Duration::from_millis(duration_ms));

            is_recording.store(false, Ordering::SeqCst);
            drop(stream);

            Ok::<u32, RecordingError>(sample_rate)
        });

        if let Some(progress) = on_progress {
            let start = Instant::now();
            let progress_clone = Arc::clone(&progress);
            let is_recording = Arc::clone(&self.is_recording);

            tokio::spawn(async move {
                let mut ticker = interval(TokioDuration::from_millis(100));
                while is_recording.load(Ordering::SeqCst) {
                    ticker.tick().await;
                    let elapsed = start.elapsed().as_millis() as u64;
                    if elapsed >= duration_ms {
                        progress_clone(duration_ms, duration_ms);
                        break;
                    }
                    progress_clone(elapsed, duration_ms);
                }
            });
        }

        let sample_rate = record_handle
            .await
            .map_err(|e| RecordingError::RecordingFailed(format!("Task join error: {}", e)))??;

        let samples = {
            let buffer = self
                .audio_buffer
                .lock()
                .map_err(|_| RecordingError::ReadFailed("Buffer lock poisoned".into()))?;
            buffer.clone()
        };

        if samples.is_empty() {
            return Err(RecordingError::ReadFailed(
                "No audio data captured".to_string(),
            ));
        }

        // Encoding is CPU-bound, keep it off the async threads
        let codec = self.codec;
        let encoded =
            tokio::task::spawn_blocking(move || Self::encode_audio(&samples, sample_rate, codec))
                .await
                .map_err(|e| {
                    RecordingError::RecordingFailed(format!("Encode task error: {}", e))
                })??;

        Ok(encoded)
    }
}
