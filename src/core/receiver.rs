//! Receiver window: in-order delivery gate plus (for Selective Repeat)
//! out-of-order reassembly and NAK suppression.

use super::seq::{between, inc};

/// Receiver-side window state, shared by all four variants. GBN variants
/// simply never populate `arrived`/`recv_buffer` (`nr_bufs == 0`); SR uses
/// the full out-of-order reassembly path.
pub struct ReceiverWindow {
    frame_expected: u8,
    too_far: u8,
    arrived: Vec<bool>,
    recv_buffer: Vec<Vec<u8>>,
    no_nak: bool,
    nr_bufs: u8,
    max_seq: u8,
}

impl ReceiverWindow {
    /// A GBN receiver: no out-of-order buffering.
    pub fn new_gbn(max_seq: u8) -> Self {
        Self {
            frame_expected: 0,
            too_far: 0,
            arrived: Vec::new(),
            recv_buffer: Vec::new(),
            no_nak: true,
            nr_bufs: 0,
            max_seq,
        }
    }

    /// A Selective Repeat receiver with an `nr_bufs`-slot reassembly window.
    pub fn new_sr(max_seq: u8, nr_bufs: u8) -> Self {
        Self {
            frame_expected: 0,
            too_far: nr_bufs % (max_seq + 1),
            arrived: vec![false; nr_bufs as usize],
            recv_buffer: vec![Vec::new(); nr_bufs as usize],
            no_nak: true,
            nr_bufs,
            max_seq,
        }
    }

    pub fn frame_expected(&self) -> u8 {
        self.frame_expected
    }

    pub fn too_far(&self) -> u8 {
        self.too_far
    }

    pub fn no_nak(&self) -> bool {
        self.no_nak
    }

    /// The `ack` field to piggyback/send: the last in-order sequence
    /// delivered, i.e. `(frame_expected - 1) mod (max_seq + 1)`.
    pub fn current_ack(&self) -> u8 {
        if self.frame_expected == 0 {
            self.max_seq
        } else {
            self.frame_expected - 1
        }
    }

    /// GBN in-order accept: delivers iff `seq == frame_expected`.
    pub fn accept_in_order(&mut self, seq: u8, data: Vec<u8>) -> Option<Vec<u8>> {
        if seq == self.frame_expected {
            self.frame_expected = inc(self.frame_expected, self.max_seq);
            Some(data)
        } else {
            None
        }
    }

    /// Marks that a NAK has been sent; rate-limits further NAKs until the
    /// next in-order delivery.
    pub fn mark_nak_sent(&mut self) {
        self.no_nak = false;
    }

    /// SR accept: stores `data` if `seq` is in `[frame_expected, too_far)`
    /// and not already buffered, then drains the contiguous in-order prefix.
    /// Returns the payloads delivered to the network layer, in order.
    pub fn accept_out_of_order(&mut self, seq: u8, data: Vec<u8>) -> Vec<Vec<u8>> {
        debug_assert!(self.nr_bufs > 0, "accept_out_of_order requires an SR receiver");

        let idx = (seq % self.nr_bufs) as usize;

        if between(self.frame_expected, seq, self.too_far) && !self.arrived[idx] {
            self.arrived[idx] = true;
            self.recv_buffer[idx] = data;
        }

        let mut delivered = Vec::new();
        let mut head = (self.frame_expected % self.nr_bufs) as usize;

        while self.arrived[head] {
            delivered.push(std::mem::take(&mut self.recv_buffer[head]));
            self.arrived[head] = false;
            self.no_nak = true;
            self.frame_expected = inc(self.frame_expected, self.max_seq);
            self.too_far = inc(self.too_far, self.max_seq);
            head = (self.frame_expected % self.nr_bufs) as usize;
        }

        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gbn_accepts_only_expected_seq() {
        let mut rw = ReceiverWindow::new_gbn(7);
        assert_eq!(rw.accept_in_order(1, vec![9]), None);
        assert_eq!(rw.accept_in_order(0, vec![1]), Some(vec![1]));
        assert_eq!(rw.frame_expected(), 1);
        assert_eq!(rw.current_ack(), 0);
    }

    #[test]
    fn gbn_ack_wraps_before_anything_delivered() {
        let rw = ReceiverWindow::new_gbn(7);
        assert_eq!(rw.current_ack(), 7);
    }

    #[test]
    fn sr_reorders_out_of_order_arrivals() {
        // MAX_SEQ=7, NR_BUFS=4
        let mut rw = ReceiverWindow::new_sr(7, 4);
        assert_eq!(rw.too_far(), 4);

        assert_eq!(rw.accept_out_of_order(0, vec![0]), vec![vec![0]]);
        assert_eq!(rw.frame_expected(), 1);

        // 2 and 3 arrive before 1: buffered, nothing delivered yet
        assert!(rw.accept_out_of_order(2, vec![2]).is_empty());
        assert!(rw.accept_out_of_order(3, vec![3]).is_empty());

        // 1 arrives: drains 1, 2, 3 in order
        let delivered = rw.accept_out_of_order(1, vec![1]);
        assert_eq!(delivered, vec![vec![1], vec![2], vec![3]]);
        assert_eq!(rw.frame_expected(), 4);
        assert_eq!(rw.too_far(), 8 % 8); // wraps: too_far = (4+4) mod 8 = 0
    }

    #[test]
    fn sr_duplicate_in_window_is_dropped() {
        let mut rw = ReceiverWindow::new_sr(7, 4);
        assert!(rw.accept_out_of_order(2, vec![2]).is_empty());
        // duplicate arrival of the same out-of-order frame: no-op
        assert!(rw.accept_out_of_order(2, vec![0xFF]).is_empty());
    }

    #[test]
    fn sr_out_of_window_seq_is_ignored() {
        let mut rw = ReceiverWindow::new_sr(7, 4);
        // too_far is 4; seq=5 lies outside [0,4)
        assert!(rw.accept_out_of_order(5, vec![5]).is_empty());
    }

    #[test]
    fn no_nak_rate_limits() {
        let mut rw = ReceiverWindow::new_gbn(7);
        assert!(rw.no_nak());
        rw.mark_nak_sent();
        assert!(!rw.no_nak());
    }
}
