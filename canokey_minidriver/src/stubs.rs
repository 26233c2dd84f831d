/*
 * stubs.rs: Driver 'canokey_minidriver' - Generated entry points for operations the driver doesn't support
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

#![allow(non_snake_case)]

use cardmod_sys::types::{BYTE, DWORD, PBYTE, PDWORD, LPVOID, LPSTR, LPWSTR, LPCWSTR, PIN_ID, CARD_KEY_HANDLE,
                         PCARD_KEY_HANDLE, CARD_DIRECTORY_ACCESS_CONDITION, CARD_FILE_ACCESS_CONDITION,
                         PCARD_RSA_DECRYPT_INFO, PCARD_DH_AGREEMENT_INFO, PCARD_DERIVE_KEY, PCARD_ENCRYPTED_DATA};
use cardmod_sys::cardmod::PCARD_DATA;

use crate::error::{CardError, CardResult};

/// The one and only behavior of every stub: a null context is a malformed call, anything else is unsupported.
/// No other argument gets inspected.
fn unsupported(pCardData: PCARD_DATA, name: &'static str) -> CardResult<()> {
    if pCardData.is_null() {
        Err(CardError::InvalidParameter("pCardData is NULL"))
    }
    else {
        Err(CardError::Unsupported(name))
    }
}

// unsupported_stubs` : generates for each signature an `extern "system"` fn of that name with the exact parameter list
//    of the CARD_DATA slot it goes into; the first parameter is always the context
macro_rules! unsupported_stubs {
    ($( $name:ident ( $($arg:ident : $ty:ty),* ); )+) => {
        $(
            pub extern "system" fn $name(pCardData: PCARD_DATA $(, $arg: $ty)*) -> DWORD
            {
                $( let _ = $arg; )*
                let f = stringify!($name);
                log3ifc!(f, line!());
                log3ifr_ret!(f, line!(), unsupported(pCardData, f))
            }
        )+

        #[cfg(test)]
        const STUB_NAMES : &[&str] = &[$(stringify!($name)),+];
    };
}

unsupported_stubs! {
    CardDeleteContainer(bContainerIndex: BYTE, dwReserved: DWORD);
    CardCreateContainer(bContainerIndex: BYTE, dwFlags: DWORD, dwKeySpec: DWORD, dwKeySize: DWORD, pbKeyData: PBYTE);
    CardGetChallenge(ppbChallengeData: *mut PBYTE, pcbChallengeData: PDWORD);
    CardAuthenticateChallenge(pbResponseData: PBYTE, cbResponseData: DWORD, pcAttemptsRemaining: PDWORD);
    CardUnblockPin(pwszUserId: LPWSTR, pbAuthenticationData: PBYTE, cbAuthenticationData: DWORD,
                   pbNewPinData: PBYTE, cbNewPinData: DWORD, cRetryCount: DWORD, dwFlags: DWORD);
    CardChangeAuthenticator(pwszUserId: LPWSTR, pbCurrentAuthenticator: PBYTE, cbCurrentAuthenticator: DWORD,
                            pbNewAuthenticator: PBYTE, cbNewAuthenticator: DWORD, cRetryCount: DWORD, dwFlags: DWORD,
                            pcAttemptsRemaining: PDWORD);
    CardDeauthenticate(pwszUserId: LPWSTR, dwFlags: DWORD);
    CardCreateDirectory(pszDirectoryName: LPSTR, AccessCondition: CARD_DIRECTORY_ACCESS_CONDITION);
    CardDeleteDirectory(pszDirectoryName: LPSTR);
    CardCreateFile(pszDirectoryName: LPSTR, pszFileName: LPSTR, cbInitialCreationSize: DWORD,
                   AccessCondition: CARD_FILE_ACCESS_CONDITION);
    CardWriteFile(pszDirectoryName: LPSTR, pszFileName: LPSTR, dwFlags: DWORD, pbData: PBYTE, cbData: DWORD);
    CardDeleteFile(pszDirectoryName: LPSTR, pszFileName: LPSTR, dwFlags: DWORD);
    CardRSADecrypt(pInfo: PCARD_RSA_DECRYPT_INFO);
    CardConstructDHAgreement(pAgreementInfo: PCARD_DH_AGREEMENT_INFO);
    CardDeriveKey(pAgreementInfo: PCARD_DERIVE_KEY);
    CardDestroyDHAgreement(bSecretAgreementIndex: BYTE, dwFlags: DWORD);
    CardGetChallengeEx(PinId: PIN_ID, ppbChallengeData: *mut PBYTE, pcbChallengeData: PDWORD, dwFlags: DWORD);
    CardChangeAuthenticatorEx(dwFlags: DWORD, dwAuthenticatingPinId: PIN_ID, pbAuthenticatingPinData: PBYTE,
                              cbAuthenticatingPinData: DWORD, dwTargetPinId: PIN_ID, pbTargetData: PBYTE,
                              cbTargetData: DWORD, cRetryCount: DWORD, pcAttemptsRemaining: PDWORD);
    CardSetContainerProperty(bContainerIndex: BYTE, wszProperty: LPCWSTR, pbData: PBYTE, cbDataLen: DWORD,
                             dwFlags: DWORD);
    MDImportSessionKey(pwszBlobType: LPCWSTR, pwszAlgId: LPCWSTR, phKey: PCARD_KEY_HANDLE, pbInput: PBYTE,
                       cbInput: DWORD);
    MDEncryptData(hKey: CARD_KEY_HANDLE, pwszSecureFunction: LPCWSTR, pbInput: PBYTE, cbInput: DWORD, dwFlags: DWORD,
                  ppEncryptedData: *mut PCARD_ENCRYPTED_DATA, pcEncryptedData: PDWORD);
    CardImportSessionKey(bContainerIndex: BYTE, pPaddingInfo: LPVOID, pwszBlobType: LPCWSTR, pwszAlgId: LPCWSTR,
                         phKey: PCARD_KEY_HANDLE, pbInput: PBYTE, cbInput: DWORD, dwFlags: DWORD);
    CardGetSharedKeyHandle(pbInput: PBYTE, cbInput: DWORD, ppbOutput: *mut PBYTE, pcbOutput: PDWORD,
                           phKey: PCARD_KEY_HANDLE);
    CardGetAlgorithmProperty(pwszAlgId: LPCWSTR, pwszProperty: LPCWSTR, pbData: PBYTE, cbData: DWORD,
                             pdwDataLen: PDWORD, dwFlags: DWORD);
    CardGetKeyProperty(hKey: CARD_KEY_HANDLE, pwszProperty: LPCWSTR, pbData: PBYTE, cbData: DWORD,
                       pdwDataLen: PDWORD, dwFlags: DWORD);
    CardSetKeyProperty(hKey: CARD_KEY_HANDLE, pwszProperty: LPCWSTR, pbInput: PBYTE, cbInput: DWORD, dwFlags: DWORD);
    CardDestroyKey(hKey: CARD_KEY_HANDLE);
    CardProcessEncryptedData(hKey: CARD_KEY_HANDLE, pwszSecureFunction: LPCWSTR, pEncryptedData: PCARD_ENCRYPTED_DATA,
                             cEncryptedData: DWORD, pbOutput: PBYTE, cbOutput: DWORD, pdwOutputLen: PDWORD,
                             dwFlags: DWORD);
    CardCreateContainerEx(bContainerIndex: BYTE, dwFlags: DWORD, dwKeySpec: DWORD, dwKeySize: DWORD, pbKeyData: PBYTE,
                          PinId: PIN_ID);
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr::{null, null_mut};
    use cardmod_sys::cardmod::CARD_DATA;
    use cardmod_sys::errors::{ERROR_INVALID_PARAMETER, SCARD_E_UNSUPPORTED_FEATURE};

    #[test]
    fn test_stub_count() {
        assert_eq!(29, STUB_NAMES.len());
    }

    #[test]
    fn test_null_context() {
        assert_eq!(ERROR_INVALID_PARAMETER, CardDeleteContainer(null_mut(), 0, 0));
        assert_eq!(ERROR_INVALID_PARAMETER, CardDestroyKey(null_mut(), 0));
        assert_eq!(ERROR_INVALID_PARAMETER, CardRSADecrypt(null_mut(), null_mut()));
    }

    #[test]
    fn test_arguments_are_not_inspected() {
        let mut card = CARD_DATA::default();
        let pcd: PCARD_DATA = &mut card;
        assert_eq!(SCARD_E_UNSUPPORTED_FEATURE, CardDeleteContainer(pcd, 0xFF, 0xFFFF_FFFF));
        assert_eq!(SCARD_E_UNSUPPORTED_FEATURE, CardRSADecrypt(pcd, null_mut()));
        assert_eq!(SCARD_E_UNSUPPORTED_FEATURE, CardGetChallenge(pcd, null_mut(), null_mut()));
        assert_eq!(SCARD_E_UNSUPPORTED_FEATURE,
                   CardGetAlgorithmProperty(pcd, null(), null(), null_mut(), 0, null_mut(), 0));
        assert_eq!(SCARD_E_UNSUPPORTED_FEATURE, CardCreateContainerEx(pcd, 0, 0, 0, 2048, null_mut(), 1));
    }
}
