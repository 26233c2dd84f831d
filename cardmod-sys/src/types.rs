/*
 * types.rs: Win32 scalar types and the plain structs exchanged through cardmod.h
 *
 * Copyright (C) 2019-  for the binding: Carsten Blüggel <bluecars@posteo.eu>
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
 * Foundation, Inc., 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA
 */

// Binding state: header: complete for the structs a minidriver reads or writes itself; the remaining
// cardmod.h structs are declared opaque (they only ever cross this layer as pointers)

use std::os::raw::{c_char, c_void};

/* Win32 scalar types, fixed width independent of the build host */
pub type BYTE       = u8;
pub type WORD       = u16;
pub type DWORD      = u32;
pub type BOOL       = i32;
pub type WCHAR      = u16;
pub type SIZE_T     = usize;
pub type ULONG_PTR  = usize;

pub type PBYTE      = *mut BYTE;
pub type PDWORD     = *mut DWORD;
pub type LPDWORD    = *mut DWORD;
pub type PVOID      = *mut c_void;
pub type LPVOID     = *mut c_void;
pub type LPSTR      = *mut c_char;
pub type LPWSTR     = *mut WCHAR;
pub type LPCWSTR    = *const WCHAR;

pub const TRUE  : BOOL = 1;
pub const FALSE : BOOL = 0;

/* winscard.h */
pub type SCARDCONTEXT = ULONG_PTR;
pub type SCARDHANDLE  = ULONG_PTR;

/* cardmod.h scalar aliases */
pub type PIN_ID          = DWORD;
pub type PIN_SET         = DWORD;
pub type CARD_KEY_HANDLE = ULONG_PTR;
pub type PCARD_KEY_HANDLE = *mut CARD_KEY_HANDLE;

pub type CARD_DIRECTORY_ACCESS_CONDITION = DWORD;
pub type CARD_FILE_ACCESS_CONDITION      = DWORD;

pub const MAX_PINS     : PIN_ID = 8;
pub const ROLE_EVERYONE: PIN_ID = 0;
pub const ROLE_USER    : PIN_ID = 1;
pub const ROLE_ADMIN   : PIN_ID = 2;

pub const PIN_SET_NONE : PIN_SET = 0x00;
pub const PIN_SET_ALL_ROLES : PIN_SET = 0xFF;

/// CREATE_PIN_SET(PinId) of cardmod.h
#[must_use]
pub const fn create_pin_set(pin_id: PIN_ID) -> PIN_SET {
    1 << pin_id
}

pub const CARD_CAPABILITIES_CURRENT_VERSION : DWORD = 1;

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct CARD_CAPABILITIES {
    pub dwVersion               : DWORD,
    pub fCertificateCompression : BOOL,
    pub fKeyGen                 : BOOL,
}
pub type PCARD_CAPABILITIES = *mut CARD_CAPABILITIES;

/* SECRET_TYPE */
pub const AlphaNumericPinType      : DWORD = 0;
pub const ExternalPinType          : DWORD = 1;
pub const ChallengeResponsePinType : DWORD = 2;
pub const EmptyPinType             : DWORD = 3;

/* SECRET_PURPOSE */
pub const AuthenticationPin   : DWORD = 0;
pub const DigitalSignaturePin : DWORD = 1;
pub const EncryptionPin       : DWORD = 2;
pub const NonRepudiationPin   : DWORD = 3;
pub const AdministratorPin    : DWORD = 4;
pub const PrimaryCardPin      : DWORD = 5;
pub const UnblockOnlyPin      : DWORD = 6;

/* PIN_CACHE_POLICY_TYPE */
pub const PinCacheNormal       : DWORD = 0;
pub const PinCacheTimed        : DWORD = 1;
pub const PinCacheNone         : DWORD = 2;
pub const PinCacheAlwaysPrompt : DWORD = 3;

pub const PIN_CACHE_POLICY_CURRENT_VERSION : DWORD = 6;
pub const PIN_INFO_CURRENT_VERSION         : DWORD = 6;

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct PIN_CACHE_POLICY {
    pub dwVersion            : DWORD,
    pub PinCachePolicyType   : DWORD,
    pub dwPinCachePolicyInfo : DWORD,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct PIN_INFO {
    pub dwVersion           : DWORD,
    pub PinType             : DWORD,
    pub PinPurpose          : DWORD,
    pub dwChangePermission  : PIN_SET,
    pub dwUnblockPermission : PIN_SET,
    pub PinCachePolicy      : PIN_CACHE_POLICY,
    pub dwFlags             : DWORD,
}
pub type PPIN_INFO = *mut PIN_INFO;

/* CP_CARD_CACHE_MODE values */
pub const CP_CACHE_MODE_GLOBAL_CACHE : DWORD = 1;
pub const CP_CACHE_MODE_SESSION_ONLY : DWORD = 2;
pub const CP_CACHE_MODE_NO_CACHE     : DWORD = 3;

/// Layout of the well-known cache file `cardcf`
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct CARD_CACHE_FILE_FORMAT {
    pub bVersion             : BYTE,
    pub bPinsFreshness       : BYTE,
    pub wContainersFreshness : WORD,
    pub wFilesFreshness      : WORD,
}

pub const CARD_FILE_INFO_CURRENT_VERSION : DWORD = 1;

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct CARD_FILE_INFO {
    pub dwVersion       : DWORD,
    pub cbFileSize      : DWORD,
    pub AccessCondition : CARD_FILE_ACCESS_CONDITION,
}
pub type PCARD_FILE_INFO = *mut CARD_FILE_INFO;

pub const CARD_FREE_SPACE_INFO_CURRENT_VERSION : DWORD = 1;

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct CARD_FREE_SPACE_INFO {
    pub dwVersion                : DWORD,
    pub dwBytesAvailable         : DWORD,
    pub dwKeyContainersAvailable : DWORD,
    pub dwMaxKeyContainers       : DWORD,
}
pub type PCARD_FREE_SPACE_INFO = *mut CARD_FREE_SPACE_INFO;

pub const CONTAINER_INFO_CURRENT_VERSION : DWORD = 1;

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct CONTAINER_INFO {
    pub dwVersion        : DWORD,
    pub dwReserved       : DWORD,
    pub cbSigPublicKey   : DWORD,
    pub pbSigPublicKey   : PBYTE,
    pub cbKeyExPublicKey : DWORD,
    pub pbKeyExPublicKey : PBYTE,
}
pub type PCONTAINER_INFO = *mut CONTAINER_INFO;

pub const CARD_KEY_SIZES_CURRENT_VERSION : DWORD = 1;

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct CARD_KEY_SIZES {
    pub dwVersion           : DWORD,
    pub dwMinimumBitlen     : DWORD,
    pub dwDefaultBitlen     : DWORD,
    pub dwMaximumBitlen     : DWORD,
    pub dwIncrementalBitlen : DWORD,
}
pub type PCARD_KEY_SIZES = *mut CARD_KEY_SIZES;

/* structs that this layer only ever passes along as pointers */
#[repr(C)]
pub struct CARD_SIGNING_INFO      { _private: [u8; 0] }
#[repr(C)]
pub struct CARD_RSA_DECRYPT_INFO  { _private: [u8; 0] }
#[repr(C)]
pub struct CARD_DH_AGREEMENT_INFO { _private: [u8; 0] }
#[repr(C)]
pub struct CARD_DERIVE_KEY        { _private: [u8; 0] }
#[repr(C)]
pub struct CARD_ENCRYPTED_DATA    { _private: [u8; 0] }

pub type PCARD_SIGNING_INFO      = *mut CARD_SIGNING_INFO;
pub type PCARD_RSA_DECRYPT_INFO  = *mut CARD_RSA_DECRYPT_INFO;
pub type PCARD_DH_AGREEMENT_INFO = *mut CARD_DH_AGREEMENT_INFO;
pub type PCARD_DERIVE_KEY        = *mut CARD_DERIVE_KEY;
pub type PCARD_ENCRYPTED_DATA    = *mut CARD_ENCRYPTED_DATA;
