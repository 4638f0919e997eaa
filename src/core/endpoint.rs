//! The endpoint's dispatch loop: reacts to each incoming event, driving a
//! sender window, a receiver window and a variant policy over the three
//! injected external collaborators.

use tracing::{debug, trace};

use super::event::Event;
use super::frame::{self, Frame};
use super::policy::{DataTimeoutAction, NakAction, VariantPolicy};
use super::receiver::ReceiverWindow;
use super::sender::SenderWindow;
use super::traits::{NetworkLayer, PhysicalLayer, TimerService};

/// An endpoint running one of the four protocol variants, parameterised by
/// its policy and the three external collaborators.
pub struct Endpoint<P: VariantPolicy> {
    policy: P,
    sender: SenderWindow,
    receiver: ReceiverWindow,
    physical: Box<dyn PhysicalLayer>,
    network: Box<dyn NetworkLayer>,
    timers: Box<dyn TimerService>,
    phl_ready: bool,
}

impl<P: VariantPolicy> Endpoint<P> {
    /// Builds a fresh endpoint and enables the network layer so the first
    /// `NetworkLayerReady` event can fire.
    pub fn new(
        policy: P,
        physical: Box<dyn PhysicalLayer>,
        network: Box<dyn NetworkLayer>,
        timers: Box<dyn TimerService>,
    ) -> Self {
        let max_seq = policy.max_seq();
        let nr_bufs = policy.nr_bufs();

        let sender = SenderWindow::new(policy.window_size(), policy.ring_size(), max_seq);
        let receiver = if nr_bufs == 0 {
            ReceiverWindow::new_gbn(max_seq)
        } else {
            ReceiverWindow::new_sr(max_seq, nr_bufs)
        };

        let mut endpoint = Self {
            policy,
            sender,
            receiver,
            physical,
            network,
            timers,
            phl_ready: false,
        };

        endpoint.network.enable();
        endpoint
    }

    /// Read-only access, mainly for tests asserting invariants.
    pub fn sender(&self) -> &SenderWindow {
        &self.sender
    }

    /// Read-only access, mainly for tests asserting invariants.
    pub fn receiver(&self) -> &ReceiverWindow {
        &self.receiver
    }

    fn slot_of(&self, seq: u8) -> u8 {
        seq % self.policy.ring_size()
    }

    fn send_data_frame(&mut self, seq: u8) {
        let frame = Frame::Data {
            seq,
            ack: self.receiver.current_ack(),
            data: self.sender.payload(seq).to_vec(),
        };

        trace!(seq, ack = frame.ack(), "Send DATA");
        self.timers.start_timer(self.slot_of(seq), self.policy.data_timer_ms());
        self.physical.send_frame(&frame::encode(&frame));
        self.phl_ready = false;
        self.timers.stop_ack_timer();
    }

    fn send_ack_frame(&mut self) {
        let ack = self.receiver.current_ack();
        trace!(ack, "Send ACK");
        self.physical.send_frame(&frame::encode(&Frame::Ack { ack }));
        self.phl_ready = false;
        self.timers.stop_ack_timer();
    }

    fn send_nak_frame(&mut self) {
        let ack = self.receiver.current_ack();
        trace!(ack, "Send NAK");
        self.physical.send_frame(&frame::encode(&Frame::Nak { ack }));
        self.phl_ready = false;
        self.timers.stop_ack_timer();
        self.receiver.mark_nak_sent();
    }

    fn retransmit_window(&mut self) {
        self.sender.rewind_to_ack_expected();
        for seq in self.sender.in_flight() {
            self.send_data_frame(seq);
        }
    }

    /// Processes one event, then recomputes network-layer admission: the
    /// layer stays enabled only while the send window has room and the
    /// physical layer is idle.
    pub fn step(&mut self, event: Event) {
        match event {
            Event::NetworkLayerReady => {
                let packet = self
                    .network
                    .get_packet()
                    .expect("NETWORK_LAYER_READY implies a packet is available");
                let seq = self.sender.queue_packet(packet);
                self.send_data_frame(seq);
            }

            Event::PhysicalLayerReady => {
                self.phl_ready = true;
            }

            Event::FrameReceived(bytes) => self.on_frame_received(&bytes),

            Event::DataTimeout { slot } => {
                debug!(slot, "Data timeout");
                match self.policy.on_data_timeout(&self.sender, slot, &*self.timers) {
                    DataTimeoutAction::RetransmitWindow => self.retransmit_window(),
                    DataTimeoutAction::RetransmitOne(seq) => self.send_data_frame(seq),
                }
            }

            Event::AckTimeout => {
                debug!("Ack timeout");
                if self.policy.emits_standalone_ack() {
                    self.send_ack_frame();
                }
            }
        }

        if self.sender.can_send() && self.phl_ready {
            self.network.enable();
        } else {
            self.network.disable();
        }
    }

    fn on_frame_received(&mut self, bytes: &[u8]) {
        let frame = match frame::decode(bytes) {
            Ok(frame) => frame,
            Err(err) => {
                debug!(?err, "Receiver error, bad frame");
                if self.policy.nak_on_crc_fail() && self.receiver.no_nak() {
                    self.send_nak_frame();
                }
                return;
            }
        };

        match &frame {
            Frame::Data { seq, data, .. } => {
                trace!(seq, ack = frame.ack(), "Recv DATA");
                self.on_data_received(*seq, data.clone());
            }
            Frame::Ack { ack } => {
                trace!(ack, "Recv ACK");
            }
            Frame::Nak { ack } => {
                trace!(ack, "Recv NAK");
                if self.policy.supports_nak() {
                    self.on_nak_received(*ack);
                }
            }
        }

        // Cumulative ACK applies to every frame kind: the NAK's `ack` field
        // is the boundary the sender must advance through before acting on
        // the NAK itself, which is why this runs *after* the per-kind
        // handling above.
        for seq in self.sender.advance_ack(frame.ack()) {
            self.timers.stop_timer(self.slot_of(seq));
        }
    }

    fn on_data_received(&mut self, seq: u8, data: Vec<u8>) {
        if self.policy.buffers_out_of_order() {
            if seq != self.receiver.frame_expected() && self.receiver.no_nak() {
                self.send_nak_frame();
            } else {
                self.timers.start_ack_timer(self.policy.ack_timer_ms());
            }

            let delivered = self.receiver.accept_out_of_order(seq, data);
            if !delivered.is_empty() {
                self.timers.start_ack_timer(self.policy.ack_timer_ms());
            }
            for packet in delivered {
                self.network.put_packet(&packet);
            }
        } else if let Some(packet) = self.receiver.accept_in_order(seq, data) {
            self.network.put_packet(&packet);
            if self.policy.emits_standalone_ack() {
                self.timers.start_ack_timer(self.policy.ack_timer_ms());
            }
        }
        // else: out-of-order GBN DATA is silently discarded; GBN-nak's NAK
        // is sent only on CRC failure, never on seq mismatch.
    }

    fn on_nak_received(&mut self, nak_ack: u8) {
        match self.policy.on_nak(&self.sender, nak_ack) {
            NakAction::RetransmitWindow => self.retransmit_window(),
            NakAction::RetransmitOne(seq) => self.send_data_frame(seq),
            NakAction::Ignore => {}
        }
    }
}
