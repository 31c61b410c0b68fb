//! End-to-end wire scenarios over full sessions.

use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;

use telnego::compress::{Deflater, Inflater, MccpVersion};
use telnego::encoding::TextEncoding;
use telnego::negotiation::{QState, Side};
use telnego::options::ttype::TtypePlugin;
use telnego::telnet::op_command::{DO, DONT, EOR, IAC, SB, SE, WILL};
use telnego::telnet::op_option::{
    AUTHENTICATION, CHARSET, MCCP2, NAWS, TELOPT_EOR, TSPEED, TTYPE,
};
use telnego::{Session, SessionBuilder};

fn server() -> SessionBuilder {
    Session::server().with_default_plugins().on_submit(|_, _| {})
}

fn client() -> SessionBuilder {
    Session::client().with_default_plugins().on_submit(|_, _| {})
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[test]
fn naws_80_by_24() {
    let naws_seen = Rc::new(RefCell::new(None));
    let naws_log = naws_seen.clone();
    let mut server = server()
        .on_naws(move |height, width| *naws_log.borrow_mut() = Some((height, width)))
        .build()
        .unwrap();

    // Server bring-up asks DO NAWS.
    let greeting = server.take_outbound();
    assert!(contains(&greeting, &[IAC, DO, NAWS]));

    // Client agrees.
    let mut client = client().build().unwrap();
    client.take_outbound();
    client.interpret(&[IAC, DO, NAWS]).unwrap();
    assert_eq!(&client.take_outbound()[..], &[IAC, WILL, NAWS]);

    server.interpret(&[IAC, WILL, NAWS]).unwrap();
    server
        .interpret(&[IAC, SB, NAWS, 0x00, 0x50, 0x00, 0x18, IAC, SE])
        .unwrap();

    // Callback order is (height, width); wire order was width, height.
    assert_eq!(*naws_seen.borrow(), Some((24, 80)));
    assert_eq!(server.window_size(), (80, 24));
}

#[test]
fn client_sends_naws_report() {
    let mut client = client().build().unwrap();
    client.interpret(&[IAC, DO, NAWS]).unwrap();
    client.take_outbound();

    client.send_naws(132, 50).unwrap();
    let mut expected = vec![IAC, SB, NAWS];
    expected.extend(132u16.to_be_bytes());
    expected.extend(50u16.to_be_bytes());
    expected.extend([IAC, SE]);
    assert_eq!(&client.take_outbound()[..], &expected[..]);
}

#[test]
fn server_refuses_do_naws() {
    let mut server = server().build().unwrap();
    server.take_outbound();
    server.interpret(&[IAC, DO, NAWS]).unwrap();
    assert_eq!(&server.take_outbound()[..], &[IAC, 252, NAWS]);
}

#[test]
fn charset_utf8_negotiation() {
    let mut server = server().build().unwrap();
    let greeting = server.take_outbound();
    assert!(contains(&greeting, &[IAC, WILL, CHARSET]));

    let mut client = client().build().unwrap();
    // The client opens with WILL CHARSET of its own accord.
    assert!(contains(&client.take_outbound(), &[IAC, WILL, CHARSET]));

    // Server sees the client's WILL: DO, then the REQUEST list.
    server.interpret(&[IAC, WILL, CHARSET]).unwrap();
    let mut expected = vec![IAC, DO, CHARSET, IAC, SB, CHARSET, 0x01];
    expected.extend_from_slice(b";utf-8;iso-8859-1;utf-16;utf-16BE;utf-32;utf-32BE;us-ascii");
    expected.extend([IAC, SE]);
    assert_eq!(&server.take_outbound()[..], &expected[..]);

    // Client answers ACCEPTED utf-8 and switches immediately.
    client.interpret(&[IAC, DO, CHARSET]).unwrap();
    let mut request = vec![IAC, SB, CHARSET, 0x01];
    request.extend_from_slice(b";utf-8;iso-8859-1;utf-16;utf-16BE;utf-32;utf-32BE;us-ascii");
    request.extend([IAC, SE]);
    client.interpret(&request).unwrap();

    let mut accepted = vec![IAC, SB, CHARSET, 0x02];
    accepted.extend_from_slice(b"utf-8");
    accepted.extend([IAC, SE]);
    assert_eq!(&client.take_outbound()[..], &accepted[..]);
    assert_eq!(client.encoding(), TextEncoding::Utf8);

    // Server processes ACCEPTED; both ends now agree.
    server.interpret(&accepted).unwrap();
    assert_eq!(server.encoding(), TextEncoding::Utf8);
}

#[test]
fn ttype_cycles_until_repeat() {
    let mut server = server().build().unwrap();
    server.take_outbound();

    // Client offers terminal types unprompted.
    server.interpret(&[IAC, WILL, TTYPE]).unwrap();
    assert_eq!(
        &server.take_outbound()[..],
        &[IAC, DO, TTYPE, IAC, SB, TTYPE, 0x01, IAC, SE]
    );

    let is_frame = |name: &[u8]| {
        let mut frame = vec![IAC, SB, TTYPE, 0x00];
        frame.extend_from_slice(name);
        frame.extend([IAC, SE]);
        frame
    };

    server.interpret(&is_frame(b"ANSI")).unwrap();
    assert_eq!(
        &server.take_outbound()[..],
        &[IAC, SB, TTYPE, 0x01, IAC, SE]
    );

    server.interpret(&is_frame(b"VT100")).unwrap();
    assert_eq!(
        &server.take_outbound()[..],
        &[IAC, SB, TTYPE, 0x01, IAC, SE]
    );

    // The repeat ends the cycle; no further SEND goes out.
    server.interpret(&is_frame(b"VT100")).unwrap();
    assert!(server.take_outbound().is_empty());

    let ttype = server.plugin_ref::<TtypePlugin>().unwrap();
    assert_eq!(ttype.terminal_types(), ["ANSI", "VT100"]);
    assert!(ttype.cycling_done());
}

#[test]
fn authentication_empty_offer() {
    let auth_reply = Rc::new(RefCell::new(None));
    let auth_log = auth_reply.clone();
    let mut server = server()
        .on_auth_response(move |payload| *auth_log.borrow_mut() = Some(payload.to_vec()))
        .build()
        .unwrap();
    let greeting = server.take_outbound();
    assert!(contains(&greeting, &[IAC, DO, AUTHENTICATION]));

    let mut client = client().build().unwrap();
    client.take_outbound();
    client.interpret(&[IAC, DO, AUTHENTICATION]).unwrap();
    assert_eq!(&client.take_outbound()[..], &[IAC, WILL, AUTHENTICATION]);

    // Server offers an empty list of auth types.
    server.interpret(&[IAC, WILL, AUTHENTICATION]).unwrap();
    assert_eq!(
        &server.take_outbound()[..],
        &[IAC, SB, AUTHENTICATION, 0x01, IAC, SE]
    );

    // Client replies IS NULL with no data.
    client
        .interpret(&[IAC, SB, AUTHENTICATION, 0x01, IAC, SE])
        .unwrap();
    assert_eq!(
        &client.take_outbound()[..],
        &[IAC, SB, AUTHENTICATION, 0x00, 0x00, 0x00, IAC, SE]
    );

    server
        .interpret(&[IAC, SB, AUTHENTICATION, 0x00, 0x00, 0x00, IAC, SE])
        .unwrap();
    assert_eq!(*auth_reply.borrow(), Some(vec![0x00, 0x00]));
}

#[test]
fn eor_prompt_marker() {
    let prompts = Rc::new(RefCell::new(0));
    let prompt_count = prompts.clone();
    let lines = Rc::new(RefCell::new(Vec::new()));
    let lines_log = lines.clone();
    let mut client = Session::client()
        .with_default_plugins()
        .on_submit(move |line, _| lines_log.borrow_mut().push(line.to_owned()))
        .on_prompt(move || *prompt_count.borrow_mut() += 1)
        .build()
        .unwrap();
    client.take_outbound();

    let mut server = server().build().unwrap();
    server.take_outbound();

    // Negotiate end-of-record.
    client.interpret(&[IAC, WILL, TELOPT_EOR]).unwrap();
    assert_eq!(&client.take_outbound()[..], &[IAC, DO, TELOPT_EOR]);
    server.interpret(&[IAC, DO, TELOPT_EOR]).unwrap();
    assert_eq!(server.option_state(TELOPT_EOR, Side::Local), QState::Yes);

    // The server-side prompt ends in IAC EOR, not a newline.
    server.send_prompt("HP:100>").unwrap();
    let wire = server.take_outbound();
    let mut expected = b"HP:100>".to_vec();
    expected.extend([IAC, EOR]);
    assert_eq!(&wire[..], &expected[..]);

    client.interpret(&wire).unwrap();
    assert_eq!(*prompts.borrow(), 1);
    // The prompt text is retrievable as a partial line.
    assert_eq!(client.flush_partial_line().as_deref(), Some(&b"HP:100>"[..]));
    assert!(lines.borrow().is_empty());
}

#[test]
fn prompt_without_eor_uses_crlf() {
    let mut server = server().build().unwrap();
    server.take_outbound();
    server.send_prompt("> ").unwrap();
    assert_eq!(&server.take_outbound()[..], b"> \r\n");
}

#[test]
fn mccp2_compresses_from_the_byte_after_se() {
    let compression = Rc::new(RefCell::new(Vec::new()));
    let compression_log = compression.clone();
    let mut server = server()
        .on_compression_state(move |version, enabled| {
            compression_log.borrow_mut().push((version, enabled));
        })
        .build()
        .unwrap();
    let greeting = server.take_outbound();
    assert!(contains(&greeting, &[IAC, WILL, MCCP2]));

    server.interpret(&[IAC, DO, MCCP2]).unwrap();
    let wire = server.take_outbound();
    // The enabling subnegotiation itself is the last plaintext.
    assert_eq!(&wire[..], &[IAC, SB, MCCP2, IAC, SE]);
    assert_eq!(
        compression.borrow()[..],
        [(MccpVersion::V2, true)]
    );

    // Everything after is deflate output that inflates back.
    server.send_application("You enter the crypt.\r\n").unwrap();
    let compressed = server.take_outbound();
    assert!(!compressed.is_empty());
    assert!(!contains(&compressed, b"crypt"));
    let mut inflater = Inflater::new(MccpVersion::V2);
    let plain = inflater.inflate(&compressed).unwrap().data;
    assert_eq!(plain, b"You enter the crypt.\r\n");
}

#[test]
fn mccp2_client_inflates_from_the_byte_after_se() {
    let lines = Rc::new(RefCell::new(Vec::new()));
    let lines_log = lines.clone();
    let mut client = Session::client()
        .with_default_plugins()
        .on_submit(move |line, _| lines_log.borrow_mut().push(line.to_owned()))
        .build()
        .unwrap();
    client.take_outbound();

    client.interpret(&[IAC, WILL, MCCP2]).unwrap();
    assert_eq!(&client.take_outbound()[..], &[IAC, DO, MCCP2]);

    // One buffer: plaintext line, the enabling SB, then compressed text.
    let mut deflater = Deflater::new(MccpVersion::V2);
    let mut wire = b"plain before\r\n".to_vec();
    wire.extend([IAC, SB, MCCP2, IAC, SE]);
    wire.extend(deflater.deflate(b"compressed after\r\n").unwrap());

    client.interpret(&wire).unwrap();
    assert_eq!(
        lines.borrow()[..],
        ["plain before".to_owned(), "compressed after".to_owned()]
    );
}

#[test]
fn mccp3_compresses_client_egress() {
    let lines = Rc::new(RefCell::new(Vec::new()));
    let lines_log = lines.clone();
    let mut server = Session::server()
        .with_default_plugins()
        .on_submit(move |line, _| lines_log.borrow_mut().push(line.to_owned()))
        .build()
        .unwrap();
    let greeting = server.take_outbound();
    assert!(contains(&greeting, &[IAC, WILL, 87]));

    let mut client = client().build().unwrap();
    client.take_outbound();

    // Accepting WILL MCCP3 makes the client announce and compress.
    client.interpret(&[IAC, WILL, 87]).unwrap();
    let announce = client.take_outbound();
    assert_eq!(&announce[..], &[IAC, DO, 87, IAC, SB, 87, IAC, SE]);

    client.send_application("hi from client\r\n").unwrap();
    let compressed = client.take_outbound();
    assert!(!contains(&compressed, b"client"));

    // The server inflates from the byte after the received SE.
    server.interpret(&announce).unwrap();
    server.interpret(&compressed).unwrap();
    assert_eq!(lines.borrow()[..], ["hi from client".to_owned()]);
}

#[test]
fn environ_variables_reach_the_server() {
    use telnego::options::environ::EnvironPlugin;

    let seen = Rc::new(RefCell::new(None));
    let seen_log = seen.clone();
    let mut server = server()
        .on_environment(move |vars, user_vars| {
            *seen_log.borrow_mut() = Some((vars.clone(), user_vars.clone()));
        })
        .build()
        .unwrap();
    server.take_outbound();

    let mut client = client().build().unwrap();
    client.take_outbound();
    {
        let environ = client.plugin_mut::<EnvironPlugin>().unwrap();
        environ.config_mut().vars.insert("USER".into(), "jo".into());
        environ
            .config_mut()
            .user_vars
            .insert("ROLE".into(), "wizard".into());
    }

    // NEW-ENVIRON is option 39; the server requests everything.
    server.interpret(&[IAC, WILL, 39]).unwrap();
    let request = server.take_outbound();
    assert_eq!(&request[..], &[IAC, SB, 39, 0x01, IAC, SE]);

    client.interpret(&[IAC, DO, 39]).unwrap();
    client.take_outbound();
    client.interpret(&request).unwrap();
    server.interpret(&client.take_outbound()).unwrap();

    let seen = seen.borrow();
    let (vars, user_vars) = seen.as_ref().unwrap();
    assert_eq!(vars.get("USER").map(String::as_str), Some("jo"));
    assert_eq!(user_vars.get("ROLE").map(String::as_str), Some("wizard"));
}

#[test]
fn charset_with_no_common_ground_is_rejected() {
    use telnego::options::charset::{CharsetConfig, CharsetPlugin};

    let mut client = Session::client()
        .register(Box::new(CharsetPlugin::with_config(CharsetConfig {
            separator: b';',
            preference: vec![TextEncoding::Utf32Be],
        })))
        .on_submit(|_, _| {})
        .build()
        .unwrap();
    client.take_outbound();

    let mut request = vec![IAC, SB, CHARSET, 0x01];
    request.extend_from_slice(b";utf-8;iso-8859-1");
    request.extend([IAC, SE]);
    client.interpret(&request).unwrap();

    // REJECTED, and the session encoding stays at its default.
    assert_eq!(&client.take_outbound()[..], &[IAC, SB, CHARSET, 0x03, IAC, SE]);
    assert_eq!(client.encoding(), TextEncoding::UsAscii);
}

#[test]
fn negotiated_encoding_governs_inbound_lines() {
    let lines = Rc::new(RefCell::new(Vec::new()));
    let lines_log = lines.clone();
    let mut client = Session::client()
        .with_default_plugins()
        .on_submit(move |line, encoding| {
            lines_log.borrow_mut().push((line.to_owned(), encoding));
        })
        .build()
        .unwrap();
    client.take_outbound();

    let mut request = vec![IAC, SB, CHARSET, 0x01];
    request.extend_from_slice(b";utf-8");
    request.extend([IAC, SE]);
    client.interpret(&request).unwrap();
    client.take_outbound();

    client.interpret("caf\u{E9}\r\n".as_bytes()).unwrap();
    assert_eq!(
        lines.borrow()[..],
        [("caf\u{E9}".to_owned(), TextEncoding::Utf8)]
    );
}

#[test]
fn application_bytes_are_iac_escaped() {
    let mut server = server().build().unwrap();
    server.take_outbound();
    server.send_application_bytes(&[0x01, 0xFF, 0x02]).unwrap();
    assert_eq!(&server.take_outbound()[..], &[0x01, 0xFF, 0xFF, 0x02]);
}

#[test]
fn linemode_mode_is_acked() {
    let mut client = client().build().unwrap();
    client.take_outbound();

    // LINEMODE is option 34; MODE 1 with the EDIT flag.
    client.interpret(&[IAC, DO, 34]).unwrap();
    assert_eq!(&client.take_outbound()[..], &[IAC, WILL, 34]);

    client.interpret(&[IAC, SB, 34, 0x01, 0x01, IAC, SE]).unwrap();
    assert_eq!(
        &client.take_outbound()[..],
        &[IAC, SB, 34, 0x01, 0x05, IAC, SE]
    );
}

#[test]
fn xdisploc_reaches_the_server() {
    use telnego::options::xdisploc::XdisplocPlugin;

    let display = Rc::new(RefCell::new(None));
    let display_log = display.clone();
    let mut server = server()
        .on_xdisplay(move |value| *display_log.borrow_mut() = Some(value.to_owned()))
        .build()
        .unwrap();
    server.take_outbound();

    let mut client = client().build().unwrap();
    client.take_outbound();
    client
        .plugin_mut::<XdisplocPlugin>()
        .unwrap()
        .set_display("keep:0.0");

    // XDISPLOC is option 35.
    server.interpret(&[IAC, WILL, 35]).unwrap();
    let request = server.take_outbound();
    assert_eq!(&request[..], &[IAC, SB, 35, 0x01, IAC, SE]);

    client.interpret(&[IAC, DO, 35]).unwrap();
    client.take_outbound();
    client.interpret(&request).unwrap();
    server.interpret(&client.take_outbound()).unwrap();

    assert_eq!(display.borrow().as_deref(), Some("keep:0.0"));
}

#[test]
fn corrupt_mccp_stream_is_fatal() {
    let compression = Rc::new(RefCell::new(Vec::new()));
    let compression_log = compression.clone();
    let mut client = Session::client()
        .with_default_plugins()
        .on_submit(|_, _| {})
        .on_compression_state(move |version, enabled| {
            compression_log.borrow_mut().push((version, enabled));
        })
        .build()
        .unwrap();
    client.take_outbound();

    client.interpret(&[IAC, WILL, MCCP2]).unwrap();
    let mut wire = vec![IAC, SB, MCCP2, IAC, SE];
    wire.extend([0x00, 0x01, 0x02, 0x03]);
    assert!(client.interpret(&wire).is_err());
    assert_eq!(
        compression.borrow()[..],
        [(MccpVersion::V2, true), (MccpVersion::V2, false)]
    );

    // The session stays rejected afterwards.
    assert!(client.interpret(b"more").is_err());
}

#[test]
fn unregistered_option_is_refused() {
    let mut server = server().build().unwrap();
    server.take_outbound();
    // TRANSMIT_BINARY has no plugin in the default set.
    server.interpret(&[IAC, WILL, 0]).unwrap();
    assert_eq!(&server.take_outbound()[..], &[IAC, DONT, 0]);
}

#[test]
fn tspeed_round_trip() {
    let speeds = Rc::new(RefCell::new(None));
    let speeds_log = speeds.clone();
    let mut server = server()
        .on_terminal_speed(move |tx, rx| *speeds_log.borrow_mut() = Some((tx, rx)))
        .build()
        .unwrap();
    server.take_outbound();

    let mut client = client().build().unwrap();
    client.take_outbound();
    client.interpret(&[IAC, DO, TSPEED]).unwrap();
    assert_eq!(&client.take_outbound()[..], &[IAC, WILL, TSPEED]);

    // The bring-up DO is already out, so the WILL settles silently and
    // only the SEND goes on the wire.
    server.interpret(&[IAC, WILL, TSPEED]).unwrap();
    let request = server.take_outbound();
    assert_eq!(&request[..], &[IAC, SB, TSPEED, 0x01, IAC, SE]);

    client.interpret(&request).unwrap();
    let reply = client.take_outbound();
    let mut expected = vec![IAC, SB, TSPEED, 0x00];
    expected.extend_from_slice(b"38400,38400");
    expected.extend([IAC, SE]);
    assert_eq!(&reply[..], &expected[..]);

    server.interpret(&reply).unwrap();
    assert_eq!(*speeds.borrow(), Some((38400, 38400)));
}

#[test]
fn full_session_handshake_settles() {
    let mut server = server().build().unwrap();
    let mut client = client().build().unwrap();

    // Relay traffic until both sides go quiet.
    for _ in 0..16 {
        let to_client = server.take_outbound();
        let to_server = client.take_outbound();
        if to_client.is_empty() && to_server.is_empty() {
            break;
        }
        client.interpret(&to_client).unwrap();
        server.interpret(&to_server).unwrap();
    }

    assert_eq!(server.option_state(NAWS, Side::Remote), QState::Yes);
    assert_eq!(client.option_state(NAWS, Side::Local), QState::Yes);
    assert_eq!(server.option_state(MCCP2, Side::Local), QState::Yes);
    assert_eq!(client.option_state(MCCP2, Side::Remote), QState::Yes);
    assert_eq!(server.encoding(), TextEncoding::Utf8);
    assert_eq!(client.encoding(), TextEncoding::Utf8);

    // Compressed application traffic still flows.
    server.send_application("The hallway is quiet.\r\n").unwrap();
    let wire = server.take_outbound();
    assert!(!wire.is_empty());
    client.interpret(&wire).unwrap();
}

#[test]
fn gmcp_round_trip() {
    let messages = Rc::new(RefCell::new(Vec::new()));
    let messages_log = messages.clone();
    let mut client = Session::client()
        .with_default_plugins()
        .on_submit(|_, _| {})
        .on_gmcp(move |package, json| {
            messages_log
                .borrow_mut()
                .push((package.to_owned(), json.to_owned()));
        })
        .build()
        .unwrap();
    client.take_outbound();

    let mut server = server().build().unwrap();
    server.take_outbound();
    server
        .send_gmcp("Char.Vitals", &serde_json::json!({"hp": 100}))
        .unwrap();
    client.interpret(&server.take_outbound()).unwrap();

    // Body-less packages are delivered with an empty JSON string.
    client
        .interpret(&[IAC, SB, 201, b'C', b'o', b'r', b'e', b'.', b'P', b'i', b'n', b'g', IAC, SE])
        .unwrap();

    assert_eq!(
        messages.borrow()[..],
        [
            ("Char.Vitals".to_owned(), "{\"hp\":100}".to_owned()),
            ("Core.Ping".to_owned(), String::new()),
        ]
    );
}

#[test]
fn go_ahead_suppressed_once_sga_is_agreed() {
    let mut server = server().build().unwrap();
    server.take_outbound();

    // SGA is still pending: GA goes out.
    server.send_go_ahead().unwrap();
    assert_eq!(&server.take_outbound()[..], &[IAC, 249]);

    server.interpret(&[IAC, DO, 3]).unwrap();
    server.take_outbound();
    server.send_go_ahead().unwrap();
    assert!(server.take_outbound().is_empty());
}

mod stubs {
    use std::any::Any;

    use bytes::Bytes;
    use telnego::negotiation::Side;
    use telnego::plugin::{Interest, OptionPlugin};
    use telnego::{Role, SessionCore};

    pub struct Stub {
        name: &'static str,
        codes: &'static [u8],
        deps: &'static [u8],
    }

    impl Stub {
        pub fn boxed(
            name: &'static str,
            codes: &'static [u8],
            deps: &'static [u8],
        ) -> Box<Self> {
            Box::new(Self { name, codes, deps })
        }
    }

    impl OptionPlugin for Stub {
        fn name(&self) -> &'static str {
            self.name
        }

        fn option_codes(&self) -> &'static [u8] {
            self.codes
        }

        fn interests(&self, _role: Role) -> Vec<Interest> {
            self.codes
                .iter()
                .map(|&code| Interest::new(code, Side::Remote))
                .collect()
        }

        fn dependencies(&self) -> &'static [u8] {
            self.deps
        }

        fn on_subnegotiation(&mut self, _core: &mut SessionCore, _option: u8, _payload: &Bytes) {}

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }
}

#[test]
fn disable_refused_while_dependent_is_enabled() {
    use telnego::TelnetError;

    let mut server = Session::server()
        .register(stubs::Stub::boxed("base", &[100], &[]))
        .register(stubs::Stub::boxed("addon", &[101], &[100]))
        .on_submit(|_, _| {})
        .build()
        .unwrap();
    server.take_outbound();

    server.interpret(&[IAC, WILL, 100, IAC, WILL, 101]).unwrap();
    server.take_outbound();

    let err = server.disable_plugin(100).unwrap_err();
    assert!(matches!(err, TelnetError::ActiveDependents { option: 100, .. }));

    // Once the dependent is gone the disable goes through.
    server.interpret(&[IAC, 252, 101]).unwrap();
    server.take_outbound();
    server.disable_plugin(100).unwrap();
    assert_eq!(&server.take_outbound()[..], &[IAC, DONT, 100]);

    assert!(matches!(
        server.disable_plugin(222).unwrap_err(),
        TelnetError::NoSuchPlugin(222)
    ));
}

#[test]
fn dispose_rejects_further_input() {
    let mut server = server().build().unwrap();
    server.dispose();
    assert!(server.interpret(b"hello").is_err());
    // Idempotent.
    server.dispose();
}
