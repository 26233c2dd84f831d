/*
 * cardmod.rs: The Smart Card Minidriver contract: CARD_DATA, function pointer types, well-known names
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
 * Foundation, 51 Franklin Street, Fifth Floor  Boston, MA 02110-1335  USA
 */

// Binding state: header: complete up to CARD_DATA_VERSION_SEVEN, doc: partial, tests: struct layout

use std::ffi::CStr;
use std::ptr::null_mut;

use crate::types::{BYTE, DWORD, PBYTE, PDWORD, LPDWORD, PVOID, LPVOID, LPSTR, LPWSTR, LPCWSTR, WCHAR, SIZE_T,
                   SCARDCONTEXT, SCARDHANDLE, PIN_ID, PIN_SET, CARD_KEY_HANDLE, PCARD_KEY_HANDLE,
                   CARD_DIRECTORY_ACCESS_CONDITION, CARD_FILE_ACCESS_CONDITION, PCARD_CAPABILITIES,
                   PCONTAINER_INFO, PCARD_FILE_INFO, PCARD_FREE_SPACE_INFO, PCARD_KEY_SIZES, PCARD_SIGNING_INFO,
                   PCARD_RSA_DECRYPT_INFO, PCARD_DH_AGREEMENT_INFO, PCARD_DERIVE_KEY, PCARD_ENCRYPTED_DATA};

/* CARD_DATA.dwVersion */
pub const CARD_DATA_VERSION_FOUR    : DWORD = 4;
pub const CARD_DATA_VERSION_FIVE    : DWORD = 5;
pub const CARD_DATA_VERSION_SIX     : DWORD = 6;
pub const CARD_DATA_VERSION_SEVEN   : DWORD = 7;
pub const CARD_DATA_CURRENT_VERSION : DWORD = CARD_DATA_VERSION_SEVEN;

/* CardAcquireContext dwFlags */
pub const CARD_SECURE_KEY_INJECTION_NO_CARD_MODE : DWORD = 0x1;

/* Well-known directories and files */
pub const szBASE_CSP_DIR       : &CStr = c"mscp";
pub const szCACHE_FILE         : &CStr = c"cardcf";
pub const szCARD_IDENTIFIER_FILE: &CStr = c"cardid";
pub const szCONTAINER_MAP_FILE : &CStr = c"cmapfile";
pub const szROOT_STORE_FILE    : &CStr = c"msroots";

/// Widens an ASCII, NUL-terminated byte string into a UTF-16 one at compile time
#[must_use]
pub const fn wide<const N: usize>(ascii: &[u8; N]) -> [WCHAR; N] {
    let mut out = [0; N];
    let mut i = 0;
    while i < N {
        out[i] = ascii[i] as WCHAR;
        i += 1;
    }
    out
}

/* Card properties (CardGetProperty/CardSetProperty), UTF-16 including the terminating NUL */
pub const CP_CARD_FREE_SPACE              : &[WCHAR] = &wide(b"Free Space\0");
pub const CP_CARD_CAPABILITIES            : &[WCHAR] = &wide(b"Capabilities\0");
pub const CP_CARD_KEYSIZES                : &[WCHAR] = &wide(b"Key Sizes\0");
pub const CP_CARD_READ_ONLY               : &[WCHAR] = &wide(b"Card Read Only\0");
pub const CP_CARD_CACHE_MODE              : &[WCHAR] = &wide(b"Card Cache Mode\0");
pub const CP_SUPPORTS_WIN_X509_ENROLLMENT : &[WCHAR] = &wide(b"Supports Windows x.509 Enrollment\0");
pub const CP_CARD_GUID                    : &[WCHAR] = &wide(b"Card Guid\0");
pub const CP_CARD_SERIAL_NO               : &[WCHAR] = &wide(b"Card Serial Number\0");
pub const CP_CARD_PIN_INFO                : &[WCHAR] = &wide(b"PIN Information\0");
pub const CP_CARD_LIST_PINS               : &[WCHAR] = &wide(b"PIN List\0");
pub const CP_CARD_AUTHENTICATED_STATE     : &[WCHAR] = &wide(b"Authenticated State\0");
pub const CP_CARD_PIN_STRENGTH_VERIFY     : &[WCHAR] = &wide(b"PIN Strength Verify\0");
pub const CP_KEY_IMPORT_SUPPORT           : &[WCHAR] = &wide(b"Key Import Support\0");
pub const CP_PARENT_WINDOW                : &[WCHAR] = &wide(b"Parent Window\0");
pub const CP_PIN_CONTEXT_STRING           : &[WCHAR] = &wide(b"PIN Context String\0");

/* Container properties (CardGetContainerProperty/CardSetContainerProperty) */
pub const CCP_CONTAINER_INFO              : &[WCHAR] = &wide(b"Container Info\0");
pub const CCP_PIN_IDENTIFIER              : &[WCHAR] = &wide(b"PIN Identifier\0");
pub const CCP_ASSOCIATED_ECDH_KEY         : &[WCHAR] = &wide(b"Associated ECDH Key\0");

pub const CARD_GUID_LEN : usize = 16;

/* Functions the host (Base CSP / KSP) provides to the minidriver */
pub type PFN_CSP_ALLOC             = Option<unsafe extern "system" fn(Size: SIZE_T) -> LPVOID>;
pub type PFN_CSP_REALLOC           = Option<unsafe extern "system" fn(Address: LPVOID, Size: SIZE_T) -> LPVOID>;
pub type PFN_CSP_FREE              = Option<unsafe extern "system" fn(Address: LPVOID)>;
pub type PFN_CSP_CACHE_ADD_FILE    = Option<unsafe extern "system" fn(pvCacheContext: PVOID, wszTag: LPWSTR, dwFlags: DWORD,
                                                                      pbData: PBYTE, cbData: DWORD) -> DWORD>;
pub type PFN_CSP_CACHE_LOOKUP_FILE = Option<unsafe extern "system" fn(pvCacheContext: PVOID, wszTag: LPWSTR, dwFlags: DWORD,
                                                                      ppbData: *mut PBYTE, pcbData: PDWORD) -> DWORD>;
pub type PFN_CSP_CACHE_DELETE_FILE = Option<unsafe extern "system" fn(pvCacheContext: PVOID, wszTag: LPWSTR, dwFlags: DWORD) -> DWORD>;
pub type PFN_CSP_PAD_DATA          = Option<unsafe extern "system" fn(pSigningInfo: PCARD_SIGNING_INFO, cbMaxWidth: DWORD,
                                                                      pcbPaddedBuffer: PDWORD, ppbPaddedBuffer: *mut PBYTE) -> DWORD>;
pub type PFN_CSP_GET_DH_AGREEMENT  = Option<unsafe extern "system" fn(pCardData: PCARD_DATA, hSecretAgreement: PVOID,
                                                                      pbSecretAgreementIndex: *mut BYTE, dwFlags: DWORD) -> DWORD>;
/// since CARD_DATA_VERSION_SEVEN
pub type PFN_CSP_UNPAD_DATA        = Option<unsafe extern "system" fn(pRSADecryptInfo: PCARD_RSA_DECRYPT_INFO, cbUnpaddedData: DWORD,
                                                                      pcbUnpaddedData: PDWORD, pbUnpaddedData: PBYTE) -> DWORD>;

/* Functions the minidriver provides to the host */
pub type PFN_CARD_ACQUIRE_CONTEXT        = Option<unsafe extern "system" fn(pCardData: PCARD_DATA, dwFlags: DWORD) -> DWORD>;
pub type PFN_CARD_DELETE_CONTEXT         = Option<unsafe extern "system" fn(pCardData: PCARD_DATA) -> DWORD>;
pub type PFN_CARD_QUERY_CAPABILITIES     = Option<unsafe extern "system" fn(pCardData: PCARD_DATA,
                                                                            pCardCapabilities: PCARD_CAPABILITIES) -> DWORD>;
pub type PFN_CARD_DELETE_CONTAINER       = Option<unsafe extern "system" fn(pCardData: PCARD_DATA, bContainerIndex: BYTE,
                                                                            dwReserved: DWORD) -> DWORD>;
pub type PFN_CARD_CREATE_CONTAINER       = Option<unsafe extern "system" fn(pCardData: PCARD_DATA, bContainerIndex: BYTE,
                                                                            dwFlags: DWORD, dwKeySpec: DWORD, dwKeySize: DWORD,
                                                                            pbKeyData: PBYTE) -> DWORD>;
pub type PFN_CARD_GET_CONTAINER_INFO     = Option<unsafe extern "system" fn(pCardData: PCARD_DATA, bContainerIndex: BYTE,
                                                                            dwFlags: DWORD, pContainerInfo: PCONTAINER_INFO) -> DWORD>;
pub type PFN_CARD_AUTHENTICATE_PIN       = Option<unsafe extern "system" fn(pCardData: PCARD_DATA, pwszUserId: LPWSTR, pbPin: PBYTE,
                                                                            cbPin: DWORD, pcAttemptsRemaining: PDWORD) -> DWORD>;
pub type PFN_CARD_GET_CHALLENGE          = Option<unsafe extern "system" fn(pCardData: PCARD_DATA, ppbChallengeData: *mut PBYTE,
                                                                            pcbChallengeData: PDWORD) -> DWORD>;
pub type PFN_CARD_AUTHENTICATE_CHALLENGE = Option<unsafe extern "system" fn(pCardData: PCARD_DATA, pbResponseData: PBYTE,
                                                                            cbResponseData: DWORD, pcAttemptsRemaining: PDWORD) -> DWORD>;
pub type PFN_CARD_UNBLOCK_PIN            = Option<unsafe extern "system" fn(pCardData: PCARD_DATA, pwszUserId: LPWSTR,
                                                                            pbAuthenticationData: PBYTE, cbAuthenticationData: DWORD,
                                                                            pbNewPinData: PBYTE, cbNewPinData: DWORD,
                                                                            cRetryCount: DWORD, dwFlags: DWORD) -> DWORD>;
pub type PFN_CARD_CHANGE_AUTHENTICATOR   = Option<unsafe extern "system" fn(pCardData: PCARD_DATA, pwszUserId: LPWSTR,
                                                                            pbCurrentAuthenticator: PBYTE, cbCurrentAuthenticator: DWORD,
                                                                            pbNewAuthenticator: PBYTE, cbNewAuthenticator: DWORD,
                                                                            cRetryCount: DWORD, dwFlags: DWORD,
                                                                            pcAttemptsRemaining: PDWORD) -> DWORD>;
pub type PFN_CARD_DEAUTHENTICATE         = Option<unsafe extern "system" fn(pCardData: PCARD_DATA, pwszUserId: LPWSTR,
                                                                            dwFlags: DWORD) -> DWORD>;
pub type PFN_CARD_CREATE_DIRECTORY       = Option<unsafe extern "system" fn(pCardData: PCARD_DATA, pszDirectoryName: LPSTR,
                                                                            AccessCondition: CARD_DIRECTORY_ACCESS_CONDITION) -> DWORD>;
pub type PFN_CARD_DELETE_DIRECTORY       = Option<unsafe extern "system" fn(pCardData: PCARD_DATA, pszDirectoryName: LPSTR) -> DWORD>;
pub type PFN_CARD_CREATE_FILE            = Option<unsafe extern "system" fn(pCardData: PCARD_DATA, pszDirectoryName: LPSTR,
                                                                            pszFileName: LPSTR, cbInitialCreationSize: DWORD,
                                                                            AccessCondition: CARD_FILE_ACCESS_CONDITION) -> DWORD>;
pub type PFN_CARD_READ_FILE              = Option<unsafe extern "system" fn(pCardData: PCARD_DATA, pszDirectoryName: LPSTR,
                                                                            pszFileName: LPSTR, dwFlags: DWORD, ppbData: *mut PBYTE,
                                                                            pcbData: PDWORD) -> DWORD>;
pub type PFN_CARD_WRITE_FILE             = Option<unsafe extern "system" fn(pCardData: PCARD_DATA, pszDirectoryName: LPSTR,
                                                                            pszFileName: LPSTR, dwFlags: DWORD, pbData: PBYTE,
                                                                            cbData: DWORD) -> DWORD>;
pub type PFN_CARD_DELETE_FILE            = Option<unsafe extern "system" fn(pCardData: PCARD_DATA, pszDirectoryName: LPSTR,
                                                                            pszFileName: LPSTR, dwFlags: DWORD) -> DWORD>;
pub type PFN_CARD_ENUM_FILES             = Option<unsafe extern "system" fn(pCardData: PCARD_DATA, pszDirectoryName: LPSTR,
                                                                            pmszFileNames: *mut LPSTR, pdwcbFileName: LPDWORD,
                                                                            dwFlags: DWORD) -> DWORD>;
pub type PFN_CARD_GET_FILE_INFO          = Option<unsafe extern "system" fn(pCardData: PCARD_DATA, pszDirectoryName: LPSTR,
                                                                            pszFileName: LPSTR, pCardFileInfo: PCARD_FILE_INFO) -> DWORD>;
pub type PFN_CARD_QUERY_FREE_SPACE       = Option<unsafe extern "system" fn(pCardData: PCARD_DATA, dwFlags: DWORD,
                                                                            pCardFreeSpaceInfo: PCARD_FREE_SPACE_INFO) -> DWORD>;
pub type PFN_CARD_QUERY_KEY_SIZES        = Option<unsafe extern "system" fn(pCardData: PCARD_DATA, dwKeySpec: DWORD, dwFlags: DWORD,
                                                                            pKeySizes: PCARD_KEY_SIZES) -> DWORD>;
pub type PFN_CARD_SIGN_DATA              = Option<unsafe extern "system" fn(pCardData: PCARD_DATA,
                                                                            pInfo: PCARD_SIGNING_INFO) -> DWORD>;
pub type PFN_CARD_RSA_DECRYPT            = Option<unsafe extern "system" fn(pCardData: PCARD_DATA,
                                                                            pInfo: PCARD_RSA_DECRYPT_INFO) -> DWORD>;
pub type PFN_CARD_CONSTRUCT_DH_AGREEMENT = Option<unsafe extern "system" fn(pCardData: PCARD_DATA,
                                                                            pAgreementInfo: PCARD_DH_AGREEMENT_INFO) -> DWORD>;
/* since CARD_DATA_VERSION_FIVE */
pub type PFN_CARD_DERIVE_KEY             = Option<unsafe extern "system" fn(pCardData: PCARD_DATA,
                                                                            pAgreementInfo: PCARD_DERIVE_KEY) -> DWORD>;
pub type PFN_CARD_DESTROY_DH_AGREEMENT   = Option<unsafe extern "system" fn(pCardData: PCARD_DATA, bSecretAgreementIndex: BYTE,
                                                                            dwFlags: DWORD) -> DWORD>;
/* since CARD_DATA_VERSION_SIX */
pub type PFN_CARD_GET_CHALLENGE_EX       = Option<unsafe extern "system" fn(pCardData: PCARD_DATA, PinId: PIN_ID,
                                                                            ppbChallengeData: *mut PBYTE, pcbChallengeData: PDWORD,
                                                                            dwFlags: DWORD) -> DWORD>;
pub type PFN_CARD_AUTHENTICATE_EX        = Option<unsafe extern "system" fn(pCardData: PCARD_DATA, PinId: PIN_ID, dwFlags: DWORD,
                                                                            pbPinData: PBYTE, cbPinData: DWORD,
                                                                            ppbSessionPin: *mut PBYTE, pcbSessionPin: PDWORD,
                                                                            pcAttemptsRemaining: PDWORD) -> DWORD>;
pub type PFN_CARD_CHANGE_AUTHENTICATOR_EX= Option<unsafe extern "system" fn(pCardData: PCARD_DATA, dwFlags: DWORD,
                                                                            dwAuthenticatingPinId: PIN_ID,
                                                                            pbAuthenticatingPinData: PBYTE,
                                                                            cbAuthenticatingPinData: DWORD, dwTargetPinId: PIN_ID,
                                                                            pbTargetData: PBYTE, cbTargetData: DWORD,
                                                                            cRetryCount: DWORD, pcAttemptsRemaining: PDWORD) -> DWORD>;
pub type PFN_CARD_DEAUTHENTICATE_EX      = Option<unsafe extern "system" fn(pCardData: PCARD_DATA, PinId: PIN_SET,
                                                                            dwFlags: DWORD) -> DWORD>;
pub type PFN_CARD_GET_CONTAINER_PROPERTY = Option<unsafe extern "system" fn(pCardData: PCARD_DATA, bContainerIndex: BYTE,
                                                                            wszProperty: LPCWSTR, pbData: PBYTE, cbData: DWORD,
                                                                            pdwDataLen: PDWORD, dwFlags: DWORD) -> DWORD>;
pub type PFN_CARD_SET_CONTAINER_PROPERTY = Option<unsafe extern "system" fn(pCardData: PCARD_DATA, bContainerIndex: BYTE,
                                                                            wszProperty: LPCWSTR, pbData: PBYTE, cbDataLen: DWORD,
                                                                            dwFlags: DWORD) -> DWORD>;
pub type PFN_CARD_GET_PROPERTY           = Option<unsafe extern "system" fn(pCardData: PCARD_DATA, wszProperty: LPCWSTR,
                                                                            pbData: PBYTE, cbData: DWORD, pdwDataLen: PDWORD,
                                                                            dwFlags: DWORD) -> DWORD>;
pub type PFN_CARD_SET_PROPERTY           = Option<unsafe extern "system" fn(pCardData: PCARD_DATA, wszProperty: LPCWSTR,
                                                                            pbData: PBYTE, cbDataLen: DWORD, dwFlags: DWORD) -> DWORD>;
/* since CARD_DATA_VERSION_SEVEN */
pub type PFN_MD_IMPORT_SESSION_KEY       = Option<unsafe extern "system" fn(pCardData: PCARD_DATA, pwszBlobType: LPCWSTR,
                                                                            pwszAlgId: LPCWSTR, phKey: PCARD_KEY_HANDLE,
                                                                            pbInput: PBYTE, cbInput: DWORD) -> DWORD>;
pub type PFN_MD_ENCRYPT_DATA             = Option<unsafe extern "system" fn(pCardData: PCARD_DATA, hKey: CARD_KEY_HANDLE,
                                                                            pwszSecureFunction: LPCWSTR, pbInput: PBYTE,
                                                                            cbInput: DWORD, dwFlags: DWORD,
                                                                            ppEncryptedData: *mut PCARD_ENCRYPTED_DATA,
                                                                            pcEncryptedData: PDWORD) -> DWORD>;
pub type PFN_CARD_IMPORT_SESSION_KEY     = Option<unsafe extern "system" fn(pCardData: PCARD_DATA, bContainerIndex: BYTE,
                                                                            pPaddingInfo: LPVOID, pwszBlobType: LPCWSTR,
                                                                            pwszAlgId: LPCWSTR, phKey: PCARD_KEY_HANDLE,
                                                                            pbInput: PBYTE, cbInput: DWORD, dwFlags: DWORD) -> DWORD>;
pub type PFN_CARD_GET_SHARED_KEY_HANDLE  = Option<unsafe extern "system" fn(pCardData: PCARD_DATA, pbInput: PBYTE, cbInput: DWORD,
                                                                            ppbOutput: *mut PBYTE, pcbOutput: PDWORD,
                                                                            phKey: PCARD_KEY_HANDLE) -> DWORD>;
pub type PFN_CARD_GET_ALGORITHM_PROPERTY = Option<unsafe extern "system" fn(pCardData: PCARD_DATA, pwszAlgId: LPCWSTR,
                                                                            pwszProperty: LPCWSTR, pbData: PBYTE, cbData: DWORD,
                                                                            pdwDataLen: PDWORD, dwFlags: DWORD) -> DWORD>;
pub type PFN_CARD_GET_KEY_PROPERTY       = Option<unsafe extern "system" fn(pCardData: PCARD_DATA, hKey: CARD_KEY_HANDLE,
                                                                            pwszProperty: LPCWSTR, pbData: PBYTE, cbData: DWORD,
                                                                            pdwDataLen: PDWORD, dwFlags: DWORD) -> DWORD>;
pub type PFN_CARD_SET_KEY_PROPERTY       = Option<unsafe extern "system" fn(pCardData: PCARD_DATA, hKey: CARD_KEY_HANDLE,
                                                                            pwszProperty: LPCWSTR, pbInput: PBYTE, cbInput: DWORD,
                                                                            dwFlags: DWORD) -> DWORD>;
pub type PFN_CARD_DESTROY_KEY            = Option<unsafe extern "system" fn(pCardData: PCARD_DATA, hKey: CARD_KEY_HANDLE) -> DWORD>;
pub type PFN_CARD_PROCESS_ENCRYPTED_DATA = Option<unsafe extern "system" fn(pCardData: PCARD_DATA, hKey: CARD_KEY_HANDLE,
                                                                            pwszSecureFunction: LPCWSTR,
                                                                            pEncryptedData: PCARD_ENCRYPTED_DATA,
                                                                            cEncryptedData: DWORD, pbOutput: PBYTE, cbOutput: DWORD,
                                                                            pdwOutputLen: PDWORD, dwFlags: DWORD) -> DWORD>;
pub type PFN_CARD_CREATE_CONTAINER_EX    = Option<unsafe extern "system" fn(pCardData: PCARD_DATA, bContainerIndex: BYTE,
                                                                            dwFlags: DWORD, dwKeySpec: DWORD, dwKeySize: DWORD,
                                                                            pbKeyData: PBYTE, PinId: PIN_ID) -> DWORD>;

/// The context a host hands to `CardAcquireContext`.
///
/// The host owns the struct; the minidriver fills the `pfnCard*`/`pfnMD*` members and may hang its own state on
/// `pvVendorSpecific`. Everything from `pfnCardDeleteContext` through `pfnCardCreateContainerEx` is a contiguous run
/// of pointer sized members (the "slot region").
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct CARD_DATA {
    /* these members must be initialized by the CSP/KSP before calling CardAcquireContext */
    pub dwVersion                     : DWORD,
    pub pbAtr                         : PBYTE,
    pub cbAtr                         : DWORD,
    pub pwszCardName                  : LPWSTR,
    pub pfnCspAlloc                   : PFN_CSP_ALLOC,
    pub pfnCspReAlloc                 : PFN_CSP_REALLOC,
    pub pfnCspFree                    : PFN_CSP_FREE,
    pub pfnCspCacheAddFile            : PFN_CSP_CACHE_ADD_FILE,
    pub pfnCspCacheLookupFile         : PFN_CSP_CACHE_LOOKUP_FILE,
    pub pfnCspCacheDeleteFile         : PFN_CSP_CACHE_DELETE_FILE,
    pub pvCacheContext                : PVOID,
    pub pfnCspPadData                 : PFN_CSP_PAD_DATA,
    pub hSCardCtx                     : SCARDCONTEXT,
    pub hScard                        : SCARDHANDLE,
    /* may be used by the minidriver */
    pub pvVendorSpecific              : PVOID,
    /* these members are initialized by the minidriver */
    pub pfnCardDeleteContext          : PFN_CARD_DELETE_CONTEXT,
    pub pfnCardQueryCapabilities      : PFN_CARD_QUERY_CAPABILITIES,
    pub pfnCardDeleteContainer        : PFN_CARD_DELETE_CONTAINER,
    pub pfnCardCreateContainer        : PFN_CARD_CREATE_CONTAINER,
    pub pfnCardGetContainerInfo       : PFN_CARD_GET_CONTAINER_INFO,
    pub pfnCardAuthenticatePin        : PFN_CARD_AUTHENTICATE_PIN,
    pub pfnCardGetChallenge           : PFN_CARD_GET_CHALLENGE,
    pub pfnCardAuthenticateChallenge  : PFN_CARD_AUTHENTICATE_CHALLENGE,
    pub pfnCardUnblockPin             : PFN_CARD_UNBLOCK_PIN,
    pub pfnCardChangeAuthenticator    : PFN_CARD_CHANGE_AUTHENTICATOR,
    pub pfnCardDeauthenticate         : PFN_CARD_DEAUTHENTICATE,
    pub pfnCardCreateDirectory        : PFN_CARD_CREATE_DIRECTORY,
    pub pfnCardDeleteDirectory        : PFN_CARD_DELETE_DIRECTORY,
    pub pvUnused3                     : LPVOID,
    pub pvUnused4                     : LPVOID,
    pub pfnCardCreateFile             : PFN_CARD_CREATE_FILE,
    pub pfnCardReadFile               : PFN_CARD_READ_FILE,
    pub pfnCardWriteFile              : PFN_CARD_WRITE_FILE,
    pub pfnCardDeleteFile             : PFN_CARD_DELETE_FILE,
    pub pfnCardEnumFiles              : PFN_CARD_ENUM_FILES,
    pub pfnCardGetFileInfo            : PFN_CARD_GET_FILE_INFO,
    pub pfnCardQueryFreeSpace         : PFN_CARD_QUERY_FREE_SPACE,
    pub pfnCardQueryKeySizes          : PFN_CARD_QUERY_KEY_SIZES,
    pub pfnCardSignData               : PFN_CARD_SIGN_DATA,
    pub pfnCardRSADecrypt             : PFN_CARD_RSA_DECRYPT,
    pub pfnCardConstructDHAgreement   : PFN_CARD_CONSTRUCT_DH_AGREEMENT,
    /* CARD_DATA_VERSION_FIVE */
    pub pfnCardDeriveKey              : PFN_CARD_DERIVE_KEY,
    pub pfnCardDestroyDHAgreement     : PFN_CARD_DESTROY_DH_AGREEMENT,
    pub pfnCspGetDHAgreement          : PFN_CSP_GET_DH_AGREEMENT,
    /* CARD_DATA_VERSION_SIX */
    pub pfnCardGetChallengeEx         : PFN_CARD_GET_CHALLENGE_EX,
    pub pfnCardAuthenticateEx         : PFN_CARD_AUTHENTICATE_EX,
    pub pfnCardChangeAuthenticatorEx  : PFN_CARD_CHANGE_AUTHENTICATOR_EX,
    pub pfnCardDeauthenticateEx       : PFN_CARD_DEAUTHENTICATE_EX,
    pub pfnCardGetContainerProperty   : PFN_CARD_GET_CONTAINER_PROPERTY,
    pub pfnCardSetContainerProperty   : PFN_CARD_SET_CONTAINER_PROPERTY,
    pub pfnCardGetProperty            : PFN_CARD_GET_PROPERTY,
    pub pfnCardSetProperty            : PFN_CARD_SET_PROPERTY,
    /* CARD_DATA_VERSION_SEVEN */
    pub pfnCspUnpadData               : PFN_CSP_UNPAD_DATA,
    pub pfnMDImportSessionKey         : PFN_MD_IMPORT_SESSION_KEY,
    pub pfnMDEncryptData              : PFN_MD_ENCRYPT_DATA,
    pub pfnCardImportSessionKey       : PFN_CARD_IMPORT_SESSION_KEY,
    pub pfnCardGetSharedKeyHandle     : PFN_CARD_GET_SHARED_KEY_HANDLE,
    pub pfnCardGetAlgorithmProperty   : PFN_CARD_GET_ALGORITHM_PROPERTY,
    pub pfnCardGetKeyProperty         : PFN_CARD_GET_KEY_PROPERTY,
    pub pfnCardSetKeyProperty         : PFN_CARD_SET_KEY_PROPERTY,
    pub pfnCardDestroyKey             : PFN_CARD_DESTROY_KEY,
    pub pfnCardProcessEncryptedData   : PFN_CARD_PROCESS_ENCRYPTED_DATA,
    pub pfnCardCreateContainerEx      : PFN_CARD_CREATE_CONTAINER_EX,
}
pub type PCARD_DATA = *mut CARD_DATA;

/// Number of pointer sized members from `pfnCardDeleteContext` through `pfnCardCreateContainerEx`
pub const CARD_DATA_SLOT_COUNT : usize = 48;

impl Default for CARD_DATA {
    fn default() -> Self {
        Self {
            dwVersion: 0,
            pbAtr: null_mut(),
            cbAtr: 0,
            pwszCardName: null_mut(),
            pfnCspAlloc: None,
            pfnCspReAlloc: None,
            pfnCspFree: None,
            pfnCspCacheAddFile: None,
            pfnCspCacheLookupFile: None,
            pfnCspCacheDeleteFile: None,
            pvCacheContext: null_mut(),
            pfnCspPadData: None,
            hSCardCtx: 0,
            hScard: 0,
            pvVendorSpecific: null_mut(),
            pfnCardDeleteContext: None,
            pfnCardQueryCapabilities: None,
            pfnCardDeleteContainer: None,
            pfnCardCreateContainer: None,
            pfnCardGetContainerInfo: None,
            pfnCardAuthenticatePin: None,
            pfnCardGetChallenge: None,
            pfnCardAuthenticateChallenge: None,
            pfnCardUnblockPin: None,
            pfnCardChangeAuthenticator: None,
            pfnCardDeauthenticate: None,
            pfnCardCreateDirectory: None,
            pfnCardDeleteDirectory: None,
            pvUnused3: null_mut(),
            pvUnused4: null_mut(),
            pfnCardCreateFile: None,
            pfnCardReadFile: None,
            pfnCardWriteFile: None,
            pfnCardDeleteFile: None,
            pfnCardEnumFiles: None,
            pfnCardGetFileInfo: None,
            pfnCardQueryFreeSpace: None,
            pfnCardQueryKeySizes: None,
            pfnCardSignData: None,
            pfnCardRSADecrypt: None,
            pfnCardConstructDHAgreement: None,
            pfnCardDeriveKey: None,
            pfnCardDestroyDHAgreement: None,
            pfnCspGetDHAgreement: None,
            pfnCardGetChallengeEx: None,
            pfnCardAuthenticateEx: None,
            pfnCardChangeAuthenticatorEx: None,
            pfnCardDeauthenticateEx: None,
            pfnCardGetContainerProperty: None,
            pfnCardSetContainerProperty: None,
            pfnCardGetProperty: None,
            pfnCardSetProperty: None,
            pfnCspUnpadData: None,
            pfnMDImportSessionKey: None,
            pfnMDEncryptData: None,
            pfnCardImportSessionKey: None,
            pfnCardGetSharedKeyHandle: None,
            pfnCardGetAlgorithmProperty: None,
            pfnCardGetKeyProperty: None,
            pfnCardSetKeyProperty: None,
            pfnCardDestroyKey: None,
            pfnCardProcessEncryptedData: None,
            pfnCardCreateContainerEx: None,
        }
    }
}

/// Length in WCHARs, not counting the terminating NUL, of a NUL-terminated UTF-16 string.
///
/// # Safety
/// `wsz` must be null or point to a NUL-terminated UTF-16 string.
#[must_use]
pub unsafe fn wcslen(wsz: LPCWSTR) -> usize {
    if wsz.is_null() {
        return 0;
    }
    let mut len = 0;
    while *wsz.add(len) != 0 {
        len += 1;
    }
    len
}

/// Borrows a NUL-terminated UTF-16 string as a slice without its terminating NUL; null yields `None`.
///
/// # Safety
/// `wsz` must be null or point to a NUL-terminated UTF-16 string that outlives `'a`.
#[must_use]
pub unsafe fn wide_from_ptr<'a>(wsz: LPCWSTR) -> Option<&'a [WCHAR]> {
    if wsz.is_null() {
        None
    }
    else {
        Some(std::slice::from_raw_parts(wsz, wcslen(wsz)))
    }
}

/// `CP_*` / `CCP_*` constants carry their terminating NUL, a name read from the host does not
#[must_use]
pub fn wide_eq(name: &[WCHAR], property: &[WCHAR]) -> bool {
    property.split_last().map_or(false, |(_nul, chars)| chars == name)
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{offset_of, size_of};
    use std::ptr::null;

    #[test]
    fn test_slot_region_is_contiguous() {
        let first = offset_of!(CARD_DATA, pfnCardDeleteContext);
        let last  = offset_of!(CARD_DATA, pfnCardCreateContainerEx);
        assert_eq!((CARD_DATA_SLOT_COUNT - 1) * size_of::<usize>(), last - first);
        assert_eq!(last + size_of::<usize>(), size_of::<CARD_DATA>());
        assert_eq!(size_of::<usize>(), size_of::<PFN_CARD_READ_FILE>());
    }

    #[test]
    fn test_wide_names() {
        assert_eq!(CP_CARD_GUID.len(), "Card Guid".len() + 1);
        assert_eq!(Some(&0), CP_CARD_GUID.last());
        let name: Vec<WCHAR> = "Card Guid".encode_utf16().collect();
        assert!( wide_eq(&name, CP_CARD_GUID));
        assert!(!wide_eq(&name, CP_CARD_READ_ONLY));
        assert!(!wide_eq(&name[..4], CP_CARD_GUID));
    }

    #[test]
    fn test_wide_from_ptr() {
        let wsz: Vec<WCHAR> = "PIN Information\0".encode_utf16().collect();
        let name = unsafe { wide_from_ptr(wsz.as_ptr()) }.unwrap();
        assert!(wide_eq(name, CP_CARD_PIN_INFO));
        assert!(unsafe { wide_from_ptr(null()) }.is_none());
        assert_eq!(0, unsafe { wcslen(null()) });
    }

    #[test]
    fn test_default_is_unset() {
        let card_data = CARD_DATA::default();
        assert!(card_data.pfnCardDeleteContext.is_none());
        assert!(card_data.pvVendorSpecific.is_null());
        assert_eq!(0, card_data.hScard);
    }
}
