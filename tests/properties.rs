//! Universal invariants, exercised with randomised inputs.

use std::cell::RefCell;
use std::rc::Rc;

use bytes::Bytes;
use proptest::prelude::*;

use telnego::decoder::Decoder;
use telnego::events::{Event, SubnegotiationFrame, Verb};
use telnego::negotiation::{QState, Side, Table};
use telnego::telnet::op_command::{DO, DONT, IAC, SB, SE, WILL, WONT};
use telnego::telnet::op_option::NAWS;
use telnego::{escape_iac, unescape_iac, Session};

proptest! {
    // Escaping then un-escaping any byte stream is the identity.
    #[test]
    fn escape_unescape_round_trip(data in proptest::collection::vec(any::<u8>(), 0..512)) {
        let escaped = escape_iac(data.clone());
        prop_assert_eq!(&unescape_iac(escaped)[..], &data[..]);
    }

    // At most one outbound reaction per inbound verb, and steady state
    // stays silent on duplicates.
    #[test]
    fn qmethod_reacts_at_most_once_per_verb(
        choices in proptest::collection::vec(0..4usize, 1..64),
        accept in any::<bool>(),
    ) {
        let verbs = [Verb::Will, Verb::Wont, Verb::Do, Verb::Dont];
        let mut table = Table::new();
        if accept {
            table.support(NAWS, Side::Local);
            table.support(NAWS, Side::Remote);
        }

        let total = choices.len();
        let mut replies = 0;
        for choice in choices {
            let reaction = table.receive(verbs[choice], NAWS);
            replies += usize::from(reaction.reply.is_some());
        }
        prop_assert!(replies <= total);

        // Re-affirming the settled state must not produce traffic.
        for side in [Side::Local, Side::Remote] {
            let state = table.option(NAWS).state(side);
            prop_assert!(matches!(state, QState::No | QState::Yes));
            let repeat = match (side, state) {
                (Side::Remote, QState::Yes) => Verb::Will,
                (Side::Remote, _) => Verb::Wont,
                (Side::Local, QState::Yes) => Verb::Do,
                (Side::Local, _) => Verb::Dont,
            };
            prop_assert_eq!(table.receive(repeat, NAWS).reply, None);
        }
    }

    // Unregistered options are answered with exactly one refusal.
    #[test]
    fn unregistered_option_refused_exactly(option in any::<u8>(), affirm in any::<bool>()) {
        // No plugins registered: every option is unknown.
        let mut session = Session::server().on_submit(|_, _| {}).build().unwrap();
        session.take_outbound();

        let (verb, refusal) = if affirm { (WILL, DONT) } else { (DO, WONT) };
        session.interpret(&[IAC, verb, option]).unwrap();
        prop_assert_eq!(&session.take_outbound()[..], &[IAC, refusal, option]);

        // And nothing further on a repeat.
        session.interpret(&[IAC, verb, option]).unwrap();
        prop_assert_eq!(&session.take_outbound()[..], &[IAC, refusal, option]);
    }

    // A subnegotiation payload survives escaping on the wire and arrives
    // fully de-escaped.
    #[test]
    fn subnegotiation_payload_round_trip(
        option in 0..=254u8,
        payload in proptest::collection::vec(any::<u8>(), 0..256),
    ) {
        let mut wire = vec![IAC, SB, option];
        wire.extend_from_slice(&escape_iac(payload.clone()));
        wire.extend([IAC, SE]);

        let mut decoder = Decoder::new();
        let mut events = Vec::new();
        decoder.feed_slice(&wire, &mut events);
        let expected = Event::Subnegotiation(option, Bytes::from(payload));
        prop_assert_eq!(events.last(), Some(&expected));
    }

    // Outbound frames are correctly delimited and never contain a bare
    // IAC in the payload region.
    #[test]
    fn subnegotiation_frames_are_iac_safe(
        option in 0..=254u8,
        payload in proptest::collection::vec(any::<u8>(), 0..256),
    ) {
        let bytes: Bytes = SubnegotiationFrame::new(option, payload).into();
        prop_assert_eq!(&bytes[..3], &[IAC, SB, option]);
        prop_assert_eq!(&bytes[bytes.len() - 2..], &[IAC, SE]);

        let interior = &bytes[3..bytes.len() - 2];
        let mut index = 0;
        while index < interior.len() {
            if interior[index] == IAC {
                prop_assert_eq!(interior.get(index + 1), Some(&IAC));
                index += 2;
            } else {
                index += 1;
            }
        }
    }

    // NAWS dimensions survive the wire in both directions.
    #[test]
    fn naws_round_trip(width in any::<u16>(), height in any::<u16>()) {
        let mut client = Session::client()
            .with_default_plugins()
            .on_submit(|_, _| {})
            .build()
            .unwrap();
        client.interpret(&[IAC, DO, NAWS]).unwrap();
        client.take_outbound();
        client.send_naws(width, height).unwrap();
        let wire = client.take_outbound();

        let seen = Rc::new(RefCell::new(None));
        let log = seen.clone();
        let mut server = Session::server()
            .with_default_plugins()
            .on_submit(|_, _| {})
            .on_naws(move |h, w| *log.borrow_mut() = Some((h, w)))
            .build()
            .unwrap();
        server.take_outbound();
        server.interpret(&[IAC, WILL, NAWS]).unwrap();
        server.interpret(&wire).unwrap();

        prop_assert_eq!(server.window_size(), (width, height));
        prop_assert_eq!(*seen.borrow(), Some((height, width)));
    }

    // After ACCEPTED utf-8, sends equal encode-then-escape of the text.
    #[test]
    fn charset_switch_governs_sends(text in "[ -~\u{80}-\u{3FF}]{0,64}") {
        let mut server = Session::server()
            .with_default_plugins()
            .on_submit(|_, _| {})
            .build()
            .unwrap();
        server.take_outbound();
        server.interpret(&[IAC, WILL, 42]).unwrap();
        server.take_outbound();

        let mut accepted = vec![IAC, SB, 42, 0x02];
        accepted.extend_from_slice(b"utf-8");
        accepted.extend([IAC, SE]);
        server.interpret(&accepted).unwrap();

        server.send_application(&text).unwrap();
        let expected = escape_iac(text.clone().into_bytes());
        prop_assert_eq!(&server.take_outbound()[..], &expected[..]);
    }
}

// Data bytes fed through the decoder come out in order, unaffected by
// interleaved commands.
#[test]
fn data_path_preserves_order() {
    let mut wire = Vec::new();
    wire.extend(b"ab");
    wire.extend([IAC, 241]); // NOP
    wire.extend(b"cd");
    wire.extend([IAC, IAC]); // escaped 0xFF data byte
    wire.extend(b"ef");

    let mut decoder = Decoder::new();
    let mut events = Vec::new();
    decoder.feed_slice(&wire, &mut events);

    let data: Vec<u8> = events
        .iter()
        .filter_map(|event| match event {
            Event::Data(byte) => Some(*byte),
            _ => None,
        })
        .collect();
    assert_eq!(data, b"abcd\xffef");
}
