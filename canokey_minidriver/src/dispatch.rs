/*
 * dispatch.rs: Driver 'canokey_minidriver' - The operation table: which CARD_DATA slot gets which function
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
 A host treats the whole driver as absent, if any of the slots it expects is NULL. Every operation gets either
 a real handler or the generated 'unsupported' stub (see stubs.rs). After installing, the raw slot region of
 CARD_DATA is walked once more: any gap is an integrity defect that gets logged, not returned.
*/

use std::mem::{offset_of, size_of};

use cardmod_sys::types::DWORD;
use cardmod_sys::cardmod::{CARD_DATA, CARD_DATA_SLOT_COUNT, CARD_DATA_VERSION_FOUR, CARD_DATA_VERSION_FIVE,
                           CARD_DATA_VERSION_SIX, CARD_DATA_VERSION_SEVEN};

use crate::negotiate::CardDeleteContext;
use crate::property::{CardQueryCapabilities, CardGetProperty, CardSetProperty, CardGetContainerProperty};
use crate::virtual_file::{CardReadFile, CardGetFileInfo, CardEnumFiles, CardQueryFreeSpace};
use crate::credentials::{CardGetContainerInfo, CardSignData, CardQueryKeySizes, CardAuthenticatePin,
                         CardAuthenticateEx, CardDeauthenticateEx};
use crate::stubs;

pub const OPERATION_COUNT : usize = 44;

macro_rules! operations {
    ($($op:ident => $slot:ident since $ver:expr;)+) => {
        /// One variant per `pfnCard*`/`pfnMD*` member of `CARD_DATA`
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
        pub enum Operation {
            $($op),+
        }

        impl Operation {
            /// In `CARD_DATA` member order
            pub const ALL : [Self; OPERATION_COUNT] = [$(Self::$op),+];

            /// Name of the `CARD_DATA` member
            #[must_use]
            pub const fn slot_name(self) -> &'static str {
                match self { $(Self::$op => stringify!($slot)),+ }
            }

            /// Byte offset of the `CARD_DATA` member
            #[must_use]
            pub const fn slot_offset(self) -> usize {
                match self { $(Self::$op => offset_of!(CARD_DATA, $slot)),+ }
            }

            /// The `CARD_DATA_VERSION_*` that introduced the member
            #[must_use]
            pub const fn since(self) -> DWORD {
                match self { $(Self::$op => $ver),+ }
            }
        }
    };
}

operations! {
    DeleteContext          => pfnCardDeleteContext          since CARD_DATA_VERSION_FOUR;
    QueryCapabilities      => pfnCardQueryCapabilities      since CARD_DATA_VERSION_FOUR;
    DeleteContainer        => pfnCardDeleteContainer        since CARD_DATA_VERSION_FOUR;
    CreateContainer        => pfnCardCreateContainer        since CARD_DATA_VERSION_FOUR;
    GetContainerInfo       => pfnCardGetContainerInfo       since CARD_DATA_VERSION_FOUR;
    AuthenticatePin        => pfnCardAuthenticatePin        since CARD_DATA_VERSION_FOUR;
    GetChallenge           => pfnCardGetChallenge           since CARD_DATA_VERSION_FOUR;
    AuthenticateChallenge  => pfnCardAuthenticateChallenge  since CARD_DATA_VERSION_FOUR;
    UnblockPin             => pfnCardUnblockPin             since CARD_DATA_VERSION_FOUR;
    ChangeAuthenticator    => pfnCardChangeAuthenticator    since CARD_DATA_VERSION_FOUR;
    Deauthenticate         => pfnCardDeauthenticate         since CARD_DATA_VERSION_FOUR;
    CreateDirectory        => pfnCardCreateDirectory        since CARD_DATA_VERSION_FOUR;
    DeleteDirectory        => pfnCardDeleteDirectory        since CARD_DATA_VERSION_FOUR;
    CreateFile             => pfnCardCreateFile             since CARD_DATA_VERSION_FOUR;
    ReadFile               => pfnCardReadFile               since CARD_DATA_VERSION_FOUR;
    WriteFile              => pfnCardWriteFile              since CARD_DATA_VERSION_FOUR;
    DeleteFile             => pfnCardDeleteFile             since CARD_DATA_VERSION_FOUR;
    EnumFiles              => pfnCardEnumFiles              since CARD_DATA_VERSION_FOUR;
    GetFileInfo            => pfnCardGetFileInfo            since CARD_DATA_VERSION_FOUR;
    QueryFreeSpace         => pfnCardQueryFreeSpace         since CARD_DATA_VERSION_FOUR;
    QueryKeySizes          => pfnCardQueryKeySizes          since CARD_DATA_VERSION_FOUR;
    SignData               => pfnCardSignData               since CARD_DATA_VERSION_FOUR;
    RsaDecrypt             => pfnCardRSADecrypt             since CARD_DATA_VERSION_FOUR;
    ConstructDhAgreement   => pfnCardConstructDHAgreement   since CARD_DATA_VERSION_FOUR;
    DeriveKey              => pfnCardDeriveKey              since CARD_DATA_VERSION_FIVE;
    DestroyDhAgreement     => pfnCardDestroyDHAgreement     since CARD_DATA_VERSION_FIVE;
    GetChallengeEx         => pfnCardGetChallengeEx         since CARD_DATA_VERSION_SIX;
    AuthenticateEx         => pfnCardAuthenticateEx         since CARD_DATA_VERSION_SIX;
    ChangeAuthenticatorEx  => pfnCardChangeAuthenticatorEx  since CARD_DATA_VERSION_SIX;
    DeauthenticateEx       => pfnCardDeauthenticateEx       since CARD_DATA_VERSION_SIX;
    GetContainerProperty   => pfnCardGetContainerProperty   since CARD_DATA_VERSION_SIX;
    SetContainerProperty   => pfnCardSetContainerProperty   since CARD_DATA_VERSION_SIX;
    GetProperty            => pfnCardGetProperty            since CARD_DATA_VERSION_SIX;
    SetProperty            => pfnCardSetProperty            since CARD_DATA_VERSION_SIX;
    MdImportSessionKey     => pfnMDImportSessionKey         since CARD_DATA_VERSION_SEVEN;
    MdEncryptData          => pfnMDEncryptData              since CARD_DATA_VERSION_SEVEN;
    ImportSessionKey       => pfnCardImportSessionKey       since CARD_DATA_VERSION_SEVEN;
    GetSharedKeyHandle     => pfnCardGetSharedKeyHandle     since CARD_DATA_VERSION_SEVEN;
    GetAlgorithmProperty   => pfnCardGetAlgorithmProperty   since CARD_DATA_VERSION_SEVEN;
    GetKeyProperty         => pfnCardGetKeyProperty         since CARD_DATA_VERSION_SEVEN;
    SetKeyProperty         => pfnCardSetKeyProperty         since CARD_DATA_VERSION_SEVEN;
    DestroyKey             => pfnCardDestroyKey             since CARD_DATA_VERSION_SEVEN;
    ProcessEncryptedData   => pfnCardProcessEncryptedData   since CARD_DATA_VERSION_SEVEN;
    CreateContainerEx      => pfnCardCreateContainerEx      since CARD_DATA_VERSION_SEVEN;
}

/// What an operation's slot got
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Handler {
    Real,
    /// Rejects a null context, otherwise always SCARD_E_UNSUPPORTED_FEATURE
    #[default]
    UnsupportedStub,
}

impl Operation {
    /// The operation whose slot is at byte offset `offset` of `CARD_DATA`
    #[must_use]
    pub fn at(offset: usize) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.slot_offset() == offset)
    }
}

/// Record of what `DispatchTable::populate` installed, `Operation::ALL` order
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DispatchTable {
    handlers : [Handler; OPERATION_COUNT],
}

impl Default for DispatchTable {
    fn default() -> Self {
        Self { handlers: [Handler::default(); OPERATION_COUNT] }
    }
}

impl DispatchTable {
    /// Installs a function into every operation slot of `card` and returns what went where
    pub fn populate(card: &mut CARD_DATA) -> Self {
        Self { handlers: Operation::ALL.map(|op| install(card, op)) }
    }

    #[must_use]
    pub fn handler(&self, op: Operation) -> Handler {
        self.handlers[op as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Operation, Handler)> + '_ {
        Operation::ALL.iter().copied().zip(self.handlers.iter().copied())
    }

    #[must_use]
    pub fn count(&self, handler: Handler) -> usize {
        self.handlers.iter().filter(|&&h| h == handler).count()
    }
}

#[cfg_attr(feature = "cargo-clippy", allow(clippy::too_many_lines))]
fn install(card: &mut CARD_DATA, op: Operation) -> Handler {
    use Operation as Op;
    use Handler::{Real, UnsupportedStub as Stub};
    match op {
        Op::DeleteContext         => { card.pfnCardDeleteContext         = Some(CardDeleteContext);                  Real }
        Op::QueryCapabilities     => { card.pfnCardQueryCapabilities     = Some(CardQueryCapabilities);              Real }
        Op::DeleteContainer       => { card.pfnCardDeleteContainer       = Some(stubs::CardDeleteContainer);         Stub }
        Op::CreateContainer       => { card.pfnCardCreateContainer       = Some(stubs::CardCreateContainer);         Stub }
        Op::GetContainerInfo      => { card.pfnCardGetContainerInfo      = Some(CardGetContainerInfo);               Real }
        Op::AuthenticatePin       => { card.pfnCardAuthenticatePin       = Some(CardAuthenticatePin);                Real }
        Op::GetChallenge          => { card.pfnCardGetChallenge          = Some(stubs::CardGetChallenge);            Stub }
        Op::AuthenticateChallenge => { card.pfnCardAuthenticateChallenge = Some(stubs::CardAuthenticateChallenge);   Stub }
        Op::UnblockPin            => { card.pfnCardUnblockPin            = Some(stubs::CardUnblockPin);              Stub }
        Op::ChangeAuthenticator   => { card.pfnCardChangeAuthenticator   = Some(stubs::CardChangeAuthenticator);     Stub }
        Op::Deauthenticate        => { card.pfnCardDeauthenticate        = Some(stubs::CardDeauthenticate);          Stub }
        Op::CreateDirectory       => { card.pfnCardCreateDirectory       = Some(stubs::CardCreateDirectory);         Stub }
        Op::DeleteDirectory       => { card.pfnCardDeleteDirectory       = Some(stubs::CardDeleteDirectory);         Stub }
        Op::CreateFile            => { card.pfnCardCreateFile            = Some(stubs::CardCreateFile);              Stub }
        Op::ReadFile              => { card.pfnCardReadFile              = Some(CardReadFile);                       Real }
        Op::WriteFile             => { card.pfnCardWriteFile             = Some(stubs::CardWriteFile);               Stub }
        Op::DeleteFile            => { card.pfnCardDeleteFile            = Some(stubs::CardDeleteFile);              Stub }
        Op::EnumFiles             => { card.pfnCardEnumFiles             = Some(CardEnumFiles);                      Real }
        Op::GetFileInfo           => { card.pfnCardGetFileInfo           = Some(CardGetFileInfo);                    Real }
        Op::QueryFreeSpace        => { card.pfnCardQueryFreeSpace        = Some(CardQueryFreeSpace);                 Real }
        Op::QueryKeySizes         => { card.pfnCardQueryKeySizes         = Some(CardQueryKeySizes);                  Real }
        Op::SignData              => { card.pfnCardSignData              = Some(CardSignData);                       Real }
        Op::RsaDecrypt            => { card.pfnCardRSADecrypt            = Some(stubs::CardRSADecrypt);              Stub }
        Op::ConstructDhAgreement  => { card.pfnCardConstructDHAgreement  = Some(stubs::CardConstructDHAgreement);    Stub }
        Op::DeriveKey             => { card.pfnCardDeriveKey             = Some(stubs::CardDeriveKey);               Stub }
        Op::DestroyDhAgreement    => { card.pfnCardDestroyDHAgreement    = Some(stubs::CardDestroyDHAgreement);      Stub }
        Op::GetChallengeEx        => { card.pfnCardGetChallengeEx        = Some(stubs::CardGetChallengeEx);          Stub }
        Op::AuthenticateEx        => { card.pfnCardAuthenticateEx        = Some(CardAuthenticateEx);                 Real }
        Op::ChangeAuthenticatorEx => { card.pfnCardChangeAuthenticatorEx = Some(stubs::CardChangeAuthenticatorEx);   Stub }
        Op::DeauthenticateEx      => { card.pfnCardDeauthenticateEx      = Some(CardDeauthenticateEx);               Real }
        Op::GetContainerProperty  => { card.pfnCardGetContainerProperty  = Some(CardGetContainerProperty);           Real }
        Op::SetContainerProperty  => { card.pfnCardSetContainerProperty  = Some(stubs::CardSetContainerProperty);    Stub }
        Op::GetProperty           => { card.pfnCardGetProperty           = Some(CardGetProperty);                    Real }
        Op::SetProperty           => { card.pfnCardSetProperty           = Some(CardSetProperty);                    Real }
        Op::MdImportSessionKey    => { card.pfnMDImportSessionKey        = Some(stubs::MDImportSessionKey);          Stub }
        Op::MdEncryptData         => { card.pfnMDEncryptData             = Some(stubs::MDEncryptData);               Stub }
        Op::ImportSessionKey      => { card.pfnCardImportSessionKey      = Some(stubs::CardImportSessionKey);        Stub }
        Op::GetSharedKeyHandle    => { card.pfnCardGetSharedKeyHandle    = Some(stubs::CardGetSharedKeyHandle);      Stub }
        Op::GetAlgorithmProperty  => { card.pfnCardGetAlgorithmProperty  = Some(stubs::CardGetAlgorithmProperty);    Stub }
        Op::GetKeyProperty        => { card.pfnCardGetKeyProperty        = Some(stubs::CardGetKeyProperty);          Stub }
        Op::SetKeyProperty        => { card.pfnCardSetKeyProperty        = Some(stubs::CardSetKeyProperty);          Stub }
        Op::DestroyKey            => { card.pfnCardDestroyKey            = Some(stubs::CardDestroyKey);              Stub }
        Op::ProcessEncryptedData  => { card.pfnCardProcessEncryptedData  = Some(stubs::CardProcessEncryptedData);    Stub }
        Op::CreateContainerEx     => { card.pfnCardCreateContainerEx     = Some(stubs::CardCreateContainerEx);       Stub }
    }
}

/* the slot region: every pointer sized member from pfnCardDeleteContext through pfnCardCreateContainerEx */
pub const SLOT_REGION_START : usize = offset_of!(CARD_DATA, pfnCardDeleteContext);
pub const SLOT_REGION_END   : usize = offset_of!(CARD_DATA, pfnCardCreateContainerEx) + size_of::<usize>();

const _: () = assert!(SLOT_REGION_END - SLOT_REGION_START == CARD_DATA_SLOT_COUNT * size_of::<usize>());
const _: () = assert!(OPERATION_COUNT + ALLOWED_EMPTY.len() == CARD_DATA_SLOT_COUNT);

/// Members of the slot region that this driver never fills: reserved ones and those a host fills for itself
pub const ALLOWED_EMPTY : [(usize, &str); 4] = [
    (offset_of!(CARD_DATA, pvUnused3),            "pvUnused3"),
    (offset_of!(CARD_DATA, pvUnused4),            "pvUnused4"),
    (offset_of!(CARD_DATA, pfnCspGetDHAgreement), "pfnCspGetDHAgreement"),
    (offset_of!(CARD_DATA, pfnCspUnpadData),      "pfnCspUnpadData"),
];

/// Name of the slot at byte offset `offset` of `CARD_DATA`
#[must_use]
pub fn slot_name_at(offset: usize) -> &'static str {
    Operation::at(offset).map(Operation::slot_name)
        .or_else(|| ALLOWED_EMPTY.iter().find(|(off, _)| *off == offset).map(|(_, name)| *name))
        .unwrap_or("?")
}

/// Walks the raw slot region of `card` and returns the offsets of all NULL slots not in `ALLOWED_EMPTY`
#[must_use]
pub fn unset_slots(card: &CARD_DATA) -> Vec<usize> {
    let base = (card as *const CARD_DATA).cast::<u8>();
    (SLOT_REGION_START..SLOT_REGION_END).step_by(size_of::<usize>())
        .filter(|off| !ALLOWED_EMPTY.iter().any(|(allowed, _)| allowed == off))
        .filter(|&off| unsafe { base.add(off).cast::<usize>().read_unaligned() } == 0)
        .collect()
}
