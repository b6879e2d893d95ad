//! Command Handler
//!
//! Resolves a command name to its handler, checks arity, runs the handler
//! against the [`Store`] and turns the outcome into a [`Reply`].
//!
//! ## Supported Commands
//!
//! - `PING [message]` - Test connection
//! - `SET key value [NX|XX]` - Set a key, optionally only if absent or present
//! - `GET key` - Get a key's value
//! - `DEL key [key ...]` - Delete keys
//! - `EXISTS key [key ...]` - Count existing keys
//! - `INCR key` / `INCRBY key increment` - Increment an integer value
//! - `DECR key` / `DECRBY key decrement` - Decrement an integer value
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     CommandHandler                          │
//! │                                                             │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐     │
//! │  │  execute()  │───>│  dispatch() │───>│  cmd_*()    │     │
//! │  └─────────────┘    └─────────────┘    └─────────────┘     │
//! │                                               │             │
//! │                                               ▼             │
//! │                                             Store           │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use crate::protocol::{Command, Reply};
use crate::storage::{parse_integer, SetCondition, Store, StoreError};
use std::sync::Arc;
use tracing::debug;

const ERR_SYNTAX: &str = "ERR Syntax Error";
const ERR_NOT_INTEGER: &str = "ERR value is not an integer or out of range";

/// Handles commands by dispatching them to the appropriate handlers.
#[derive(Debug, Clone)]
pub struct CommandHandler {
    /// The store shared by every connection
    storage: Arc<Store>,
}

impl CommandHandler {
    /// Creates a new command handler over the given store.
    pub fn new(storage: Arc<Store>) -> Self {
        Self { storage }
    }

    /// Returns the store this handler executes against.
    pub fn storage(&self) -> &Arc<Store> {
        &self.storage
    }

    /// Executes a decoded command frame.
    pub fn execute_command(&self, command: &Command) -> Reply {
        self.execute(&command.name, command.args.as_slice())
    }

    /// Executes a command and returns the reply.
    ///
    /// # Arguments
    ///
    /// * `name` - The command name, matched case-insensitively
    /// * `args` - The positional arguments after the name
    pub fn execute<S: AsRef<str>>(&self, name: &str, args: &[S]) -> Reply {
        let cmd = name.to_uppercase();
        let args: Vec<&str> = args.iter().map(S::as_ref).collect();

        let reply = self.dispatch(&cmd, &args);
        debug!(command = %cmd, args = args.len(), reply = %reply, "Executed command");
        reply
    }

    /// Dispatches a command to its handler.
    fn dispatch(&self, cmd: &str, args: &[&str]) -> Reply {
        match cmd {
            "PING" => self.cmd_ping(args),
            "SET" => self.cmd_set(args),
            "GET" => self.cmd_get(args),
            "DEL" => self.cmd_del(args),
            "EXISTS" => self.cmd_exists(args),
            "INCR" => self.cmd_incr(args),
            "INCRBY" => self.cmd_incrby(args),
            "DECR" => self.cmd_decr(args),
            "DECRBY" => self.cmd_decrby(args),

            _ => Reply::error(format!("ERR Unknown or disabled command \"{}\"", cmd)),
        }
    }

    // ========================================================================
    // Helper functions
    // ========================================================================

    /// Applies the shared numeric update rule and builds the reply.
    fn update_integer(&self, key: &str, delta: i64) -> Reply {
        match self.storage.incr_by(key, delta) {
            Ok(n) => Reply::integer(n),
            Err(StoreError::NotAnInteger) => Reply::error(ERR_NOT_INTEGER),
        }
    }

    // ========================================================================
    // Server Commands
    // ========================================================================

    /// PING [message]
    fn cmd_ping(&self, args: &[&str]) -> Reply {
        match args {
            [] => Reply::pong(),
            [message] => Reply::simple_string(*message),
            _ => Reply::error("ERR wrong number of arguments for \"ping\" command"),
        }
    }

    // ========================================================================
    // String Commands
    // ========================================================================

    /// SET key value [NX|XX]
    fn cmd_set(&self, args: &[&str]) -> Reply {
        let (key, value, condition) = match args {
            [key, value] => (*key, *value, SetCondition::Always),
            [key, value, option] => match option.to_uppercase().as_str() {
                "NX" => (*key, *value, SetCondition::IfAbsent),
                "XX" => (*key, *value, SetCondition::IfPresent),
                _ => return Reply::error(ERR_SYNTAX),
            },
            _ => return Reply::error("ERR wrong number of arguments for \"SET\" command"),
        };

        if self.storage.set_with_condition(key, value, condition) {
            Reply::ok()
        } else {
            Reply::null()
        }
    }

    /// GET key
    fn cmd_get(&self, args: &[&str]) -> Reply {
        let [key] = args else {
            return Reply::error("ERR wrong number of arguments for \"GET\" command");
        };

        match self.storage.get(key) {
            Some(value) => Reply::bulk_string(value),
            None => Reply::null(),
        }
    }

    /// DEL key [key ...]
    fn cmd_del(&self, args: &[&str]) -> Reply {
        if args.is_empty() {
            return Reply::error(ERR_SYNTAX);
        }

        let deleted = self.storage.delete_many(args);
        Reply::integer(deleted as i64)
    }

    /// EXISTS key [key ...]
    fn cmd_exists(&self, args: &[&str]) -> Reply {
        if args.is_empty() {
            return Reply::error(ERR_SYNTAX);
        }

        let count = self.storage.exists_many(args);
        Reply::integer(count as i64)
    }

    /// INCR key
    fn cmd_incr(&self, args: &[&str]) -> Reply {
        let [key] = args else {
            return Reply::error(ERR_SYNTAX);
        };

        self.update_integer(key, 1)
    }

    /// INCRBY key increment
    fn cmd_incrby(&self, args: &[&str]) -> Reply {
        let [key, increment] = args else {
            return Reply::error(ERR_SYNTAX);
        };

        match parse_integer(increment) {
            Some(delta) => self.update_integer(key, delta),
            None => Reply::error(ERR_NOT_INTEGER),
        }
    }

    /// DECR key
    fn cmd_decr(&self, args: &[&str]) -> Reply {
        let [key] = args else {
            return Reply::error(ERR_SYNTAX);
        };

        self.update_integer(key, -1)
    }

    /// DECRBY key decrement
    fn cmd_decrby(&self, args: &[&str]) -> Reply {
        let [key, decrement] = args else {
            return Reply::error(ERR_SYNTAX);
        };

        // i64::MIN has no positive counterpart
        match parse_integer(decrement).and_then(i64::checked_neg) {
            Some(delta) => self.update_integer(key, delta),
            None => Reply::error(ERR_NOT_INTEGER),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_handler() -> CommandHandler {
        let storage = Arc::new(Store::new());
        CommandHandler::new(storage)
    }

    fn run(handler: &CommandHandler, parts: &[&str]) -> Reply {
        handler.execute(parts[0], &parts[1..])
    }

    fn not_integer() -> Reply {
        Reply::error("ERR value is not an integer or out of range")
    }

    fn syntax_error() -> Reply {
        Reply::error("ERR Syntax Error")
    }

    #[test]
    fn test_ping() {
        let handler = create_handler();

        assert_eq!(run(&handler, &["PING"]), Reply::simple_string("PONG"));
        assert_eq!(run(&handler, &["PING", "hello"]), Reply::simple_string("hello"));
        assert_eq!(
            run(&handler, &["PING", "a", "b"]),
            Reply::error("ERR wrong number of arguments for \"ping\" command")
        );
    }

    #[test]
    fn test_command_name_case_insensitive() {
        let handler = create_handler();

        assert_eq!(run(&handler, &["ping"]), Reply::pong());
        assert_eq!(run(&handler, &["sEt", "k", "v"]), Reply::ok());
        assert_eq!(run(&handler, &["Get", "k"]), Reply::bulk_string("v"));
    }

    #[test]
    fn test_execute_command() {
        let handler = create_handler();
        let command = Command::new("SET", vec!["k".to_string(), "v".to_string()]);

        assert_eq!(handler.execute_command(&command), Reply::ok());
        assert_eq!(handler.storage().get("k"), Some("v".to_string()));
    }

    #[test]
    fn test_set_get() {
        let handler = create_handler();

        assert_eq!(run(&handler, &["SET", "key", "value"]), Reply::ok());
        assert_eq!(run(&handler, &["GET", "key"]), Reply::bulk_string("value"));
    }

    #[test]
    fn test_get_nonexistent() {
        let handler = create_handler();

        assert_eq!(run(&handler, &["GET", "nonexistent"]), Reply::null());
        assert_eq!(run(&handler, &["EXISTS", "nonexistent"]), Reply::integer(0));
        assert_eq!(run(&handler, &["DEL", "nonexistent"]), Reply::integer(0));
    }

    #[test]
    fn test_get_wrong_arity() {
        let handler = create_handler();
        let expected = Reply::error("ERR wrong number of arguments for \"GET\" command");

        assert_eq!(run(&handler, &["GET"]), expected);
        assert_eq!(run(&handler, &["GET", "a", "b"]), expected);
    }

    #[test]
    fn test_set_wrong_arity() {
        let handler = create_handler();
        let expected = Reply::error("ERR wrong number of arguments for \"SET\" command");

        assert_eq!(run(&handler, &["SET"]), expected);
        assert_eq!(run(&handler, &["SET", "k"]), expected);
        assert_eq!(run(&handler, &["SET", "k", "v", "NX", "extra"]), expected);
    }

    #[test]
    fn test_set_nx() {
        let handler = create_handler();

        assert_eq!(run(&handler, &["SET", "k", "v1", "NX"]), Reply::ok());
        assert_eq!(run(&handler, &["SET", "k", "v2", "NX"]), Reply::null());
        assert_eq!(run(&handler, &["GET", "k"]), Reply::bulk_string("v1"));
    }

    #[test]
    fn test_set_xx() {
        let handler = create_handler();

        assert_eq!(run(&handler, &["SET", "k", "v1", "XX"]), Reply::null());
        assert_eq!(run(&handler, &["EXISTS", "k"]), Reply::integer(0));

        run(&handler, &["SET", "k", "v1"]);
        assert_eq!(run(&handler, &["SET", "k", "v2", "xx"]), Reply::ok());
        assert_eq!(run(&handler, &["GET", "k"]), Reply::bulk_string("v2"));
    }

    #[test]
    fn test_set_option_case_insensitive() {
        let handler = create_handler();

        assert_eq!(run(&handler, &["SET", "k", "v", "nx"]), Reply::ok());
        assert_eq!(run(&handler, &["SET", "k", "v", "Nx"]), Reply::null());
    }

    #[test]
    fn test_set_invalid_option() {
        let handler = create_handler();

        assert_eq!(run(&handler, &["SET", "k", "v", "EX"]), syntax_error());
        assert_eq!(run(&handler, &["EXISTS", "k"]), Reply::integer(0));
    }

    #[test]
    fn test_del() {
        let handler = create_handler();

        run(&handler, &["SET", "a", "1"]);
        assert_eq!(run(&handler, &["DEL", "a", "b", "c"]), Reply::integer(1));
        assert_eq!(run(&handler, &["EXISTS", "a"]), Reply::integer(0));
        assert_eq!(run(&handler, &["DEL"]), syntax_error());
    }

    #[test]
    fn test_exists() {
        let handler = create_handler();

        run(&handler, &["SET", "key1", "value1"]);

        assert_eq!(run(&handler, &["EXISTS", "key1"]), Reply::integer(1));
        assert_eq!(run(&handler, &["EXISTS", "key1", "key1", "nope"]), Reply::integer(2));
        assert_eq!(run(&handler, &["EXISTS"]), syntax_error());
    }

    #[test]
    fn test_exists_is_idempotent() {
        let handler = create_handler();
        run(&handler, &["SET", "k", "v"]);

        for _ in 0..3 {
            assert_eq!(run(&handler, &["EXISTS", "k"]), Reply::integer(1));
            assert_eq!(run(&handler, &["EXISTS", "missing"]), Reply::integer(0));
        }
        assert_eq!(handler.storage().len(), 1);
    }

    #[test]
    fn test_incr() {
        let handler = create_handler();

        assert_eq!(run(&handler, &["INCR", "counter"]), Reply::integer(1));
        assert_eq!(run(&handler, &["GET", "counter"]), Reply::bulk_string("1"));
        assert_eq!(run(&handler, &["INCR", "counter"]), Reply::integer(2));
        assert_eq!(run(&handler, &["INCR"]), syntax_error());
    }

    #[test]
    fn test_decr() {
        let handler = create_handler();

        assert_eq!(run(&handler, &["DECR", "counter"]), Reply::integer(-1));
        assert_eq!(run(&handler, &["GET", "counter"]), Reply::bulk_string("-1"));
        assert_eq!(run(&handler, &["DECR", "counter"]), Reply::integer(-2));
        assert_eq!(run(&handler, &["DECR", "a", "b"]), syntax_error());
    }

    #[test]
    fn test_incrby_decrby() {
        let handler = create_handler();

        assert_eq!(run(&handler, &["INCRBY", "n", "10"]), Reply::integer(10));
        assert_eq!(run(&handler, &["INCRBY", "n", "-4"]), Reply::integer(6));
        assert_eq!(run(&handler, &["DECRBY", "n", "2"]), Reply::integer(4));
        assert_eq!(run(&handler, &["DECRBY", "n", "-6"]), Reply::integer(10));
        assert_eq!(run(&handler, &["GET", "n"]), Reply::bulk_string("10"));
    }

    #[test]
    fn test_decrby_absent_key() {
        let handler = create_handler();

        assert_eq!(run(&handler, &["DECRBY", "k", "3"]), Reply::integer(-3));
        assert_eq!(run(&handler, &["GET", "k"]), Reply::bulk_string("-3"));
    }

    #[test]
    fn test_incrby_absent_key_stores_canonical_value() {
        let handler = create_handler();

        assert_eq!(run(&handler, &["INCRBY", "k", "007"]), Reply::integer(7));
        assert_eq!(run(&handler, &["GET", "k"]), Reply::bulk_string("7"));
    }

    #[test]
    fn test_incrby_wrong_arity() {
        let handler = create_handler();

        assert_eq!(run(&handler, &["INCRBY", "k"]), syntax_error());
        assert_eq!(run(&handler, &["DECRBY", "k", "1", "2"]), syntax_error());
    }

    #[test]
    fn test_incrby_invalid_delta() {
        let handler = create_handler();

        for delta in ["abc", "+1", "1.5", "", "-", "99999999999999999999"] {
            assert_eq!(run(&handler, &["INCRBY", "k", delta]), not_integer());
            assert_eq!(run(&handler, &["DECRBY", "k", delta]), not_integer());
        }
        assert_eq!(run(&handler, &["EXISTS", "k"]), Reply::integer(0));
    }

    #[test]
    fn test_incr_non_integer_value() {
        let handler = create_handler();

        run(&handler, &["SET", "k", "abc"]);
        assert_eq!(run(&handler, &["INCR", "k"]), not_integer());
        assert_eq!(run(&handler, &["DECR", "k"]), not_integer());
        assert_eq!(run(&handler, &["INCRBY", "k", "5"]), not_integer());
        assert_eq!(run(&handler, &["GET", "k"]), Reply::bulk_string("abc"));
    }

    #[test]
    fn test_incr_overflow() {
        let handler = create_handler();

        run(&handler, &["SET", "k", "9223372036854775807"]);
        assert_eq!(run(&handler, &["INCR", "k"]), not_integer());
        assert_eq!(
            run(&handler, &["GET", "k"]),
            Reply::bulk_string("9223372036854775807")
        );
    }

    #[test]
    fn test_decrby_min_value() {
        let handler = create_handler();

        assert_eq!(
            run(&handler, &["DECRBY", "k", "-9223372036854775808"]),
            not_integer()
        );
        assert_eq!(run(&handler, &["EXISTS", "k"]), Reply::integer(0));
    }

    #[test]
    fn test_unknown_command() {
        let handler = create_handler();

        assert_eq!(
            run(&handler, &["foo", "bar"]),
            Reply::error("ERR Unknown or disabled command \"FOO\"")
        );
    }

    #[test]
    fn test_separate_handlers_share_store() {
        let storage = Arc::new(Store::new());
        let first = CommandHandler::new(Arc::clone(&storage));
        let second = CommandHandler::new(Arc::clone(&storage));

        run(&first, &["SET", "k", "v"]);
        assert_eq!(run(&second, &["GET", "k"]), Reply::bulk_string("v"));
    }
}
