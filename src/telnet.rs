//! Byte constants for the Telnet protocol and the MUD extension options.

/// Telnet command bytes, valid after an IAC (RFC 854).
pub mod op_command {
    /// Interpret As Command. Begins every Telnet control sequence.
    pub const IAC: u8 = 255;
    /// Indicates the demand that the other party stop performing an option.
    pub const DONT: u8 = 254;
    /// Indicates the request that the other party perform an option.
    pub const DO: u8 = 253;
    /// Indicates the refusal to perform an option.
    pub const WONT: u8 = 252;
    /// Indicates the desire to begin performing an option.
    pub const WILL: u8 = 251;
    /// Subnegotiation Begin.
    pub const SB: u8 = 250;
    /// Go Ahead.
    pub const GA: u8 = 249;
    /// No Operation.
    pub const NOP: u8 = 241;
    /// Subnegotiation End.
    pub const SE: u8 = 240;
    /// End of Record marker, used as a prompt terminator.
    /// <https://tintin.mudhalla.net/protocols/eor/>
    pub const EOR: u8 = 239;
}

/// Telnet option codes.
pub mod op_option {
    /// Transmit Binary (RFC 856).
    pub const TRANSMIT_BINARY: u8 = 0;
    /// Echo (RFC 857).
    pub const ECHO: u8 = 1;
    /// Suppress Go Ahead (RFC 858).
    pub const SUPPRESS_GO_AHEAD: u8 = 3;
    /// Status (RFC 859).
    pub const STATUS: u8 = 5;
    /// Timing Mark (RFC 860).
    pub const TIMING_MARK: u8 = 6;
    /// Terminal Type (RFC 1091).
    pub const TTYPE: u8 = 24;
    /// End of Record negotiation (RFC 885).
    pub const TELOPT_EOR: u8 = 25;
    /// Negotiate About Window Size (RFC 1073).
    pub const NAWS: u8 = 31;
    /// Terminal Speed (RFC 1079).
    pub const TSPEED: u8 = 32;
    /// Remote Flow Control (RFC 1372).
    pub const FLOWCONTROL: u8 = 33;
    /// Linemode (RFC 1184).
    pub const LINEMODE: u8 = 34;
    /// X Display Location (RFC 1096).
    pub const XDISPLOC: u8 = 35;
    /// Environment variables, superseded form (RFC 1408).
    pub const ENVIRON: u8 = 36;
    /// Authentication envelope (RFC 2941).
    pub const AUTHENTICATION: u8 = 37;
    /// New Environment variables (RFC 1572).
    pub const NEW_ENVIRON: u8 = 39;
    /// Character set negotiation (RFC 2066).
    pub const CHARSET: u8 = 42;
    /// Mud Server Status Protocol.
    /// <https://mudhalla.net/tintin/protocols/mssp/>
    pub const MSSP: u8 = 70;
    /// Mud Client Compression Protocol, v1 (never offered, recognised only).
    pub const MCCP1: u8 = 85;
    /// Mud Client Compression Protocol, v2: server-to-client deflate.
    /// <https://www.gammon.com.au/mccp/protocol.html>
    pub const MCCP2: u8 = 86;
    /// Mud Client Compression Protocol, v3: client-to-server deflate.
    pub const MCCP3: u8 = 87;
    /// Generic Mud Communication Protocol, JSON-over-subnegotiation.
    pub const GMCP: u8 = 201;
}

/// Subnegotiation payload bytes, scoped per option.
pub mod op_subneg {
    /// `IS` reply subcommand shared by TTYPE, TSPEED, XDISPLOC, ENVIRON
    /// and AUTHENTICATION.
    pub const IS: u8 = 0;
    /// `SEND` request subcommand shared by the same options.
    pub const SEND: u8 = 1;
    /// NEW-ENVIRON `INFO` unsolicited update.
    pub const INFO: u8 = 2;

    /// CHARSET subcommands (RFC 2066).
    pub mod charset {
        pub const REQUEST: u8 = 1;
        pub const ACCEPTED: u8 = 2;
        pub const REJECTED: u8 = 3;
        pub const TTABLE_IS: u8 = 4;
        pub const TTABLE_REJECTED: u8 = 5;
    }

    /// LINEMODE subcommands and mode flags (RFC 1184).
    pub mod linemode {
        pub const MODE: u8 = 1;
        pub const FORWARDMASK: u8 = 2;
        pub const SLC: u8 = 3;

        pub const MODE_EDIT: u8 = 0x01;
        pub const MODE_TRAPSIG: u8 = 0x02;
        pub const MODE_ACK: u8 = 0x04;
        pub const MODE_SOFT_TAB: u8 = 0x08;
        pub const MODE_LIT_ECHO: u8 = 0x10;
    }

    /// Environment variable type codes (RFC 1408 / RFC 1572).
    pub mod environ {
        pub const VAR: u8 = 0;
        pub const VALUE: u8 = 1;
        pub const ESC: u8 = 2;
        /// NEW-ENVIRON only.
        pub const USERVAR: u8 = 3;
    }

    /// Remote flow control subcommands (RFC 1372).
    pub mod flow {
        pub const OFF: u8 = 0;
        pub const ON: u8 = 1;
        pub const RESTART_ANY: u8 = 2;
        pub const RESTART_XON: u8 = 3;
    }

    /// MSSP variable/value markers.
    pub mod mssp {
        pub const VAR: u8 = 1;
        pub const VAL: u8 = 2;
    }
}
