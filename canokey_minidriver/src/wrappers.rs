/*
 * wrappers.rs: Driver 'canokey_minidriver' - Some wrapping functions
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
 * Foundation, 51 Franklin Street, Fifth Floor  Boston, MA 02110  USA
 */

use std::fmt::{Arguments, Display};

use log::Level;

use cardmod_sys::types::DWORD;
use cardmod_sys::errors::{SCARD_S_SUCCESS, SCARD_E_UNSUPPORTED_FEATURE, md_strerror};

use crate::error::CardResult;

const CRATE : &str = "canokey_minidriver"; // log target; each entry point should at least log 'called', except small helpers

/// Success and 'unsupported' are expected outcomes, anything else gets raised to Warn
fn level_for(rv: DWORD) -> Level {
    if rv == SCARD_S_SUCCESS || rv == SCARD_E_UNSUPPORTED_FEATURE { Level::Debug } else { Level::Warn }
}

pub fn wr_do_log(lvl: Level, f: &str, line: u32, args: Arguments<'_>)
{
    if cfg!(log) {
        log::log!(target: CRATE, lvl, "{}:{}: {}", f, line, args);
    }
}

// usage for error report with a reason, rv not returned
pub fn wr_do_log_sds(f: &str, line: u32, why: &dyn Display, rv: DWORD)
{
    if cfg!(log) {
        log::log!(target: CRATE, level_for(rv), "{}:{}: {}: 0x{:08X} ({})", f, line, why, rv, md_strerror(rv));
    }
}

pub fn wr_do_log_sds_ret(f: &str, line: u32, why: &dyn Display, rv: DWORD) -> DWORD
{
    wr_do_log_sds(f, line, why, rv);
    rv
}

// usage for ordinary return
pub fn wr_do_log_rv(f: &str, line: u32, rv: DWORD)
{
    if cfg!(log) {
        log::log!(target: CRATE, level_for(rv), "{}:{}: returning with: 0x{:08X} ({})", f, line, rv, md_strerror(rv));
    }
}

pub fn wr_do_log_rv_ret(f: &str, line: u32, rv: DWORD) -> DWORD
{
    wr_do_log_rv(f, line, rv);
    rv
}

/// The single exit of every extern entry: logs the outcome, with the reason in case of an error, and returns its code
pub fn wr_do_log_result_ret(f: &str, line: u32, res: CardResult<()>) -> DWORD
{
    match res {
        Ok(())   => wr_do_log_rv_ret(f, line, SCARD_S_SUCCESS),
        Err(err) => wr_do_log_sds_ret(f, line, &err, err.code()),
    }
}

/// Hex dump of up to 64 bytes, without separator, for log output
#[must_use]
pub fn dump_hex(data: &[u8]) -> String {
    use std::fmt::Write;
    let mut s = String::with_capacity(2 * data.len().min(64) + 3);
    for b in data.iter().take(64) {
        let _ = write!(s, "{b:02X}");
    }
    if data.len() > 64 {
        s.push_str("...");
    }
    s
}
