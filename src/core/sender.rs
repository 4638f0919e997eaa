//! Sender window: send buffer ring, window pointers, cumulative-ACK
//! accounting.

use super::seq::{arc_len, between, inc};

/// Per-endpoint sender-side window state.
pub struct SenderWindow {
    ack_expected: u8,
    next_frame_to_send: u8,
    nbuffered: u8,
    window_size: u8,
    max_seq: u8,
    ring_size: u8,
    buffer: Vec<Vec<u8>>,
}

impl SenderWindow {
    /// `ring_size` is `max_seq + 1` for GBN, `NR_BUFS` for SR.
    pub fn new(window_size: u8, ring_size: u8, max_seq: u8) -> Self {
        Self {
            ack_expected: 0,
            next_frame_to_send: 0,
            nbuffered: 0,
            window_size,
            max_seq,
            ring_size,
            buffer: vec![Vec::new(); ring_size as usize],
        }
    }

    pub fn ack_expected(&self) -> u8 {
        self.ack_expected
    }

    pub fn next_frame_to_send(&self) -> u8 {
        self.next_frame_to_send
    }

    pub fn nbuffered(&self) -> u8 {
        self.nbuffered
    }

    pub fn window_size(&self) -> u8 {
        self.window_size
    }

    /// Network-layer admission: true iff the window has room.
    pub fn can_send(&self) -> bool {
        self.nbuffered < self.window_size
    }

    fn slot(&self, seq: u8) -> usize {
        (seq % self.ring_size) as usize
    }

    /// Copies `data` into the slot for the current `next_frame_to_send`,
    /// bumps `nbuffered`, and advances the upper window edge. Returns the
    /// sequence number assigned to this packet (the DATA frame's `seq`).
    pub fn queue_packet(&mut self, data: Vec<u8>) -> u8 {
        let seq = self.next_frame_to_send;
        let idx = self.slot(seq);
        self.buffer[idx] = data;
        self.nbuffered += 1;
        self.next_frame_to_send = inc(self.next_frame_to_send, self.max_seq);
        seq
    }

    /// The buffered payload for `seq`.
    pub fn payload(&self, seq: u8) -> &[u8] {
        &self.buffer[self.slot(seq)]
    }

    /// Runs the cumulative-ACK loop: while `ack_expected` lies in
    /// `[ack_expected, ack_nr)` relative to `next_frame_to_send`, clears that
    /// slot and advances `ack_expected`. Returns the sequence numbers
    /// cleared, in order, so the caller can stop their data timers.
    pub fn advance_ack(&mut self, ack_nr: u8) -> Vec<u8> {
        let mut cleared = Vec::new();

        while between(self.ack_expected, ack_nr, self.next_frame_to_send) {
            cleared.push(self.ack_expected);
            self.nbuffered -= 1;
            self.ack_expected = inc(self.ack_expected, self.max_seq);
        }

        cleared
    }

    /// Rewinds `next_frame_to_send` back to `ack_expected`, discarding any
    /// sequence numbers assigned past the window's lower edge. Used by the
    /// GBN whole-window retransmit policy before resending every in-flight
    /// frame.
    pub fn rewind_to_ack_expected(&mut self) {
        self.next_frame_to_send = self.ack_expected;
    }

    /// The sequence numbers currently in flight, oldest first, i.e. the arc
    /// `[ack_expected, next_frame_to_send)`.
    pub fn in_flight(&self) -> Vec<u8> {
        let mut seqs = Vec::with_capacity(self.nbuffered as usize);
        let mut s = self.ack_expected;
        for _ in 0..self.nbuffered {
            seqs.push(s);
            s = inc(s, self.max_seq);
        }
        seqs
    }

    /// True iff `seq` is within the current send window
    /// `[ack_expected, next_frame_to_send)`.
    pub fn in_window(&self, seq: u8) -> bool {
        between(self.ack_expected, seq, self.next_frame_to_send)
    }

    /// Invariant check: `nbuffered` equals the arc length from
    /// `ack_expected` to `next_frame_to_send`.
    #[cfg(test)]
    fn check_invariant(&self) -> bool {
        self.nbuffered == arc_len(self.ack_expected, self.next_frame_to_send, self.max_seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_and_clean_drain() {
        let mut sw = SenderWindow::new(7, 8, 7);
        assert!(sw.can_send());

        let s0 = sw.queue_packet(vec![1]);
        let s1 = sw.queue_packet(vec![2]);
        let s2 = sw.queue_packet(vec![3]);
        assert_eq!((s0, s1, s2), (0, 1, 2));
        assert_eq!(sw.nbuffered(), 3);
        assert!(sw.check_invariant());

        // ack=2 is the cumulative ack for frames 0,1,2 (frame_expected=3 on
        // the peer, ack field = frame_expected-1)
        let cleared = sw.advance_ack(2);
        assert_eq!(cleared, vec![0, 1, 2]);
        assert_eq!(sw.ack_expected(), 3);
        assert_eq!(sw.nbuffered(), 0);
        assert!(sw.check_invariant());
    }

    #[test]
    fn window_full_blocks_admission() {
        let mut sw = SenderWindow::new(2, 8, 7);
        sw.queue_packet(vec![1]);
        sw.queue_packet(vec![2]);
        assert!(!sw.can_send());
    }

    #[test]
    fn rewind_and_in_flight_for_gbn_retransmit() {
        let mut sw = SenderWindow::new(7, 8, 7);
        sw.queue_packet(vec![0]);
        sw.queue_packet(vec![1]);
        sw.queue_packet(vec![2]);

        sw.rewind_to_ack_expected();
        assert_eq!(sw.next_frame_to_send(), 0);
        assert_eq!(sw.in_flight(), vec![0, 1, 2]);
    }

    #[test]
    fn ack_cumulative_wraps_around() {
        let mut sw = SenderWindow::new(7, 8, 7);
        for i in 0..7 {
            sw.queue_packet(vec![i]);
        }
        // next_frame_to_send wrapped to 7 (== max_seq, valid)
        assert_eq!(sw.next_frame_to_send(), 7);
        // ack=6 is the cumulative ack for frames 0..=6
        let cleared = sw.advance_ack(6);
        assert_eq!(cleared.len(), 7);
        assert_eq!(sw.nbuffered(), 0);
        assert!(sw.check_invariant());
    }
}
