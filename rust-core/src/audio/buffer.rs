//! Circular sample buffer with freshest-window read semantics
//!
//! Single writer (audio callback) appends interleaved frames, single reader
//! (analysis tick) fetches the most recent N samples of the analysis channel.
//! Unread data is silently overwritten; this is deliberately not a queue.

use std::sync::{Arc, Mutex};

use super::sink::InputSink;

struct Inner {
    /// Interleaved storage, `channels * capacity` floats, frame-major.
    data: Box<[f32]>,
    /// Next frame slot to write, wraps at `capacity`.
    write_frame: usize,
}

/// Fixed-capacity circular buffer for interleaved audio.
///
/// Capacity is in frames and never changes after construction. Storage is
/// zero-initialized, so a read before the buffer has filled returns
/// zero-padded history rather than garbage.
///
/// Both sides keep their critical section down to at most two bulk copies,
/// so the reader's lock hold time stays far below one device block and the
/// real-time writer is never starved.
pub struct SampleBuffer {
    inner: Arc<Mutex<Inner>>,
    channels: u16,
    capacity: usize,
}

impl SampleBuffer {
    /// Create a buffer holding `capacity` frames of `channels` channels.
    pub fn new(channels: u16, capacity: usize) -> Self {
        let inner = Inner {
            data: vec![0.0; channels as usize * capacity].into_boxed_slice(),
            write_frame: 0,
        };
        Self {
            inner: Arc::new(Mutex::new(inner)),
            channels,
            capacity,
        }
    }

    /// Split into writer and reader handles for the two threads.
    pub fn split(self) -> (BufferWriter, BufferReader) {
        (
            BufferWriter {
                inner: Arc::clone(&self.inner),
                channels: self.channels,
                capacity: self.capacity,
            },
            BufferReader {
                scratch: vec![0.0; self.channels as usize * self.capacity],
                inner: self.inner,
                channels: self.channels,
                capacity: self.capacity,
            },
        )
    }

    /// Buffer capacity in frames.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Writer end, owned by the audio input callback.
pub struct BufferWriter {
    inner: Arc<Mutex<Inner>>,
    channels: u16,
    capacity: usize,
}

impl BufferWriter {
    /// Append interleaved frames, wrapping and overwriting the oldest data.
    ///
    /// The critical section is at most two `copy_from_slice` calls; no
    /// allocation and no per-sample work happens under the lock. A write
    /// longer than the capacity keeps only its most recent frames, which is
    /// what a freshest-window reader would observe anyway.
    pub fn write(&self, samples: &[f32]) {
        let ch = self.channels as usize;
        let frames = samples.len() / ch;
        if frames == 0 {
            return;
        }

        // Only the last `capacity` frames can survive an oversized write.
        let keep = frames.min(self.capacity);
        let src = &samples[(frames - keep) * ch..frames * ch];

        let mut inner = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let start = inner.write_frame;
        let first = (self.capacity - start).min(keep);
        inner.data[start * ch..(start + first) * ch].copy_from_slice(&src[..first * ch]);
        let rest = keep - first;
        inner.data[..rest * ch].copy_from_slice(&src[first * ch..]);
        inner.write_frame = (start + keep) % self.capacity;
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }
}

impl Clone for BufferWriter {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            channels: self.channels,
            capacity: self.capacity,
        }
    }
}

impl InputSink for BufferWriter {
    fn on_input_frames(&mut self, samples: &[f32], channels: u16) {
        debug_assert_eq!(channels, self.channels);
        self.write(samples);
    }
}

/// Reader end, owned by the analysis tick.
pub struct BufferReader {
    inner: Arc<Mutex<Inner>>,
    channels: u16,
    capacity: usize,
    /// Interleaved staging copy so deinterleaving happens outside the lock.
    scratch: Vec<f32>,
}

impl BufferReader {
    /// Copy the most recent `out.len()` samples of channel 0 into `out`.
    ///
    /// The read position is derived from the write cursor every call, so
    /// consecutive reads overlap when the writer is slower than the reader
    /// and skip data when it is faster. Requires `out.len() <= capacity`.
    ///
    /// Under the lock the ring is staged out as at most two contiguous
    /// segments; the per-sample channel extraction runs on the staged copy
    /// after the lock is released, so the real-time writer is blocked for a
    /// bulk copy at worst.
    pub fn read_freshest(&mut self, out: &mut [f32]) {
        let n = out.len();
        debug_assert!(n <= self.capacity);
        let ch = self.channels as usize;

        {
            let inner = match self.inner.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            // Oldest frame of the freshest window of n frames.
            let start = (inner.write_frame + self.capacity - n) % self.capacity;
            let first = (self.capacity - start).min(n);
            self.scratch[..first * ch]
                .copy_from_slice(&inner.data[start * ch..(start + first) * ch]);
            let rest = n - first;
            self.scratch[first * ch..n * ch].copy_from_slice(&inner.data[..rest * ch]);
        }

        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.scratch[i * ch];
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
