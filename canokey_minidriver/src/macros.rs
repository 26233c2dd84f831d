/*
 * macros.rs: Driver 'canokey_minidriver' - logging dispatch macros
 *
 * Copyright (C) 2019-  Carsten Blüggel <bluecars@posteo.eu>
 *
 * This library is free software; you can redistribute it and/or
 * modify it under the terms of the GNU Lesser General Public
 * License as published by the Free Software Foundation; either
 * version 2.1 of the License, or (at your option) any later version.
 *
 * This library is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
 * Lesser General Public License for more details.
 *
 * You should have received a copy of the GNU Lesser General Public
 * License along with this library; if not, write to the Free Software
 * Foundation, 51 Franklin Street, Fifth Floor  Boston, MA 02110-1335  USA
 */

/*
All logging will ultimately go through the `log` facade into the file logger set up in logging.rs
All log-related macros here are dispatchers only to some wr_do_log* functions
Purpose of both together:
 - if cfg!(log) shall appear in wrappers.rs only
 - every record carries the driver function's name and line, not those of wrappers.rs
*/

// log3if` : with explicit format string and any number of arguments
//    3 == debug level
//     if : because it depends on cargo:rustc-cfg=log: if set, the macro will log, otherwise logging will be suppressed
macro_rules! log3if {
    ($f:expr, $line:expr, $($arg:tt)+) => (crate::wrappers::wr_do_log(log::Level::Debug, $f, $line, format_args!($($arg)+)));
}

// logif` : like log3if, but with explicit log::Level as first argument (warnings, integrity defects)
macro_rules! logif {
    ($lvl:expr, $f:expr, $line:expr, $($arg:tt)+) => (crate::wrappers::wr_do_log($lvl, $f, $line, format_args!($($arg)+)));
}

// log3ifr_ret` : with implicit format string; no individual format string, but prescribed
//           r : specific for logging 'return' (or 'report') situations, evaluates to the DWORD to hand back to the host
//    the one-argument form takes a CardResult<()> and collapses it
macro_rules! log3ifr_ret {
    ($f:expr, $line:expr,           $res:expr)                      => (crate::wrappers::wr_do_log_result_ret($f, $line, $res));
    ($f:expr, $line:expr, $why:expr, $rv:expr)                      => (crate::wrappers::wr_do_log_sds_ret   ($f, $line, $why, $rv));
}

// log3ifc` : with implicit format string and for 0 arguments
//       c : specific for logging 'called' situations
macro_rules! log3ifc {
    ($f:expr, $line:expr)                                           => (crate::wrappers::wr_do_log(log::Level::Debug, $f, $line, format_args!("called")));
}
