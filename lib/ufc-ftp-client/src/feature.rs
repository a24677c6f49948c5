/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

/// Extensions advertised in the `FEAT` reply.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FtpServerFeature {
    mlst: bool,
    mlsd: bool,
    size: bool,
    mdtm: bool,
    epsv: bool,
    utf8: bool,
    auth_tls: bool,
    auth_ssl: bool,
    pbsz: bool,
    prot: bool,
    rest_stream: bool,
    mlst_facts: Vec<String>,
}

impl FtpServerFeature {
    /// Parse one feature line, already trimmed.
    pub(crate) fn parse_and_set(&mut self, line: &str) {
        let (name, arg) = match line.split_once(' ') {
            Some((name, arg)) => (name, arg.trim()),
            None => (line, ""),
        };
        match name.to_ascii_uppercase().as_str() {
            "MLST" => {
                self.mlst = true;
                // facts marked with * are enabled by default
                self.mlst_facts = arg
                    .split(';')
                    .filter(|s| !s.is_empty())
                    .map(|s| s.trim_end_matches('*').to_ascii_lowercase())
                    .collect();
            }
            "MLSD" => self.mlsd = true,
            "SIZE" => self.size = true,
            "MDTM" => self.mdtm = true,
            "EPSV" => self.epsv = true,
            "UTF8" => self.utf8 = true,
            "AUTH" => {
                for mech in arg.split([' ', ';']) {
                    match mech.to_ascii_uppercase().as_str() {
                        "TLS" | "TLS-C" => self.auth_tls = true,
                        "SSL" => self.auth_ssl = true,
                        _ => {}
                    }
                }
            }
            "PBSZ" => self.pbsz = true,
            "PROT" => self.prot = true,
            "REST" => {
                if arg.eq_ignore_ascii_case("STREAM") {
                    self.rest_stream = true;
                }
            }
            _ => {}
        }
    }

    /// Parse the lines of a `211` reply.
    ///
    /// The first and the last line are free text, feature lines start with a space.
    pub fn parse_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut feature = FtpServerFeature::default();
        if lines.len() > 2 {
            for line in &lines[1..lines.len() - 1] {
                let line = line.as_ref();
                if !line.starts_with(' ') {
                    continue;
                }
                feature.parse_and_set(line.trim());
            }
        }
        feature
    }

    /// `MLSD` is used for listing if present, `LIST` otherwise.
    #[inline]
    pub fn support_mlsd(&self) -> bool {
        self.mlsd
    }

    #[inline]
    pub fn support_mlst(&self) -> bool {
        self.mlst
    }

    #[inline]
    pub fn support_size(&self) -> bool {
        self.size
    }

    #[inline]
    pub fn support_mdtm(&self) -> bool {
        self.mdtm
    }

    #[inline]
    pub fn support_epsv(&self) -> bool {
        self.epsv
    }

    #[inline]
    pub fn support_utf8(&self) -> bool {
        self.utf8
    }

    #[inline]
    pub fn support_auth_tls(&self) -> bool {
        self.auth_tls
    }

    #[inline]
    pub fn support_auth_ssl(&self) -> bool {
        self.auth_ssl
    }

    #[inline]
    pub fn support_data_protection(&self) -> bool {
        self.pbsz && self.prot
    }

    #[inline]
    pub fn support_rest_stream(&self) -> bool {
        self.rest_stream
    }

    pub fn mlst_facts(&self) -> &[String] {
        &self.mlst_facts
    }
}
