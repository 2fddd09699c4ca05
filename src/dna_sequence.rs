use anyhow::{Result, anyhow};
use bio::alphabets::dna;
use bio::io::fasta;
use gb_io::seq::{Seq, Topology};
use std::{fmt, fs::File, path::Path};

type DNAstring = Vec<u8>;

/// A template or insert sequence, backed by a GenBank record.
#[derive(Clone, Debug)]
pub struct DNAsequence {
    seq: Seq,
}

impl DNAsequence {
    pub fn from_sequence(sequence: &str) -> Result<DNAsequence> {
        Ok(DNAsequence::from_u8(sequence.as_bytes()))
    }

    pub fn from_fasta_file(filename: &str) -> Result<Vec<DNAsequence>> {
        let file = File::open(filename)?;
        fasta::Reader::new(file)
            .records()
            .map(|record| -> Result<DNAsequence> { Ok(DNAsequence::from_fasta_record(&record?)) })
            .collect()
    }

    pub fn from_genbank_file(filename: &str) -> Result<Vec<DNAsequence>> {
        Ok(gb_io::reader::parse_file(filename)?
            .into_iter()
            .map(DNAsequence::from_genbank_seq)
            .collect())
    }

    /// Reads exactly one record, choosing the parser by file extension.
    pub fn from_file(filename: &str) -> Result<DNAsequence> {
        let mut records = if Self::is_genbank_path(filename) {
            Self::from_genbank_file(filename)?
        } else {
            Self::from_fasta_file(filename)?
        };
        match records.len() {
            0 => Err(anyhow!("No sequence record found in '{filename}'")),
            1 => {
                let ret = records.remove(0);
                if ret.is_empty() {
                    Err(anyhow!("Sequence in '{filename}' is empty"))
                } else {
                    Ok(ret)
                }
            }
            n => Err(anyhow!(
                "Expected a single sequence record in '{filename}', found {n}"
            )),
        }
    }

    fn is_genbank_path(filename: &str) -> bool {
        Path::new(filename)
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .is_some_and(|ext| matches!(ext.as_str(), "gb" | "gbk" | "genbank"))
    }

    pub fn from_genbank_seq(mut seq: Seq) -> Self {
        seq.seq = Self::validate_dna_sequence(&seq.seq);
        seq.len = Some(seq.seq.len());
        Self { seq }
    }

    pub fn from_fasta_record(record: &fasta::Record) -> Self {
        let mut ret = Self::from_u8(record.seq());
        ret.seq.name = Some(record.id().to_string());
        if let Some(desc) = record.desc() {
            ret.seq.comments.push(desc.to_string())
        }
        ret
    }

    fn from_u8(s: &[u8]) -> Self {
        let s = Self::validate_dna_sequence(s);
        let seq = Seq {
            name: None,
            topology: Topology::Linear,
            date: None,
            len: Some(s.len()),
            molecule_type: None,
            division: String::new(),
            definition: None,
            accession: None,
            version: None,
            source: None,
            dblink: None,
            keywords: None,
            references: vec![],
            comments: vec![],
            seq: s,
            contig: None,
            features: vec![],
        };
        Self { seq }
    }

    /// Upper-cases, drops whitespace and replaces anything that is not an IUPAC letter with N.
    pub fn validate_dna_sequence(v: &[u8]) -> DNAstring {
        let alphabet = dna::iupac_alphabet();
        v.iter()
            .filter(|c| !c.is_ascii_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .map(|c| if alphabet.is_word([c]) { c } else { b'N' })
            .collect()
    }

    #[inline(always)]
    pub fn forward(&self) -> &[u8] {
        &self.seq.seq
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.forward().len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward().is_empty()
    }

    pub fn name(&self) -> &Option<String> {
        &self.seq.name
    }

    pub fn is_circular(&self) -> bool {
        self.seq.topology == Topology::Circular
    }

    pub fn get_forward_string(&self) -> String {
        String::from_utf8_lossy(self.forward()).to_string()
    }

    pub fn write_genbank_file(&self, filename: &str) -> Result<()> {
        let file = File::create(filename)?;
        gb_io::writer::write(file, &self.seq)?;
        Ok(())
    }
}

impl fmt::Display for DNAsequence {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(self.forward()))
    }
}

impl From<String> for DNAsequence {
    fn from(s: String) -> Self {
        DNAsequence::from_u8(s.as_bytes())
    }
}
